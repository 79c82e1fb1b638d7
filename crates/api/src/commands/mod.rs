//! Command surface over the scheduling services.
//!
//! Every command is a thin wrapper: it resolves inputs, delegates to a core
//! service and logs its duration and outcome.

pub mod calendar;
pub mod health;
pub mod meetings;
pub mod status;

pub use calendar::{
    get_calendar_events, get_meeting_statistics, get_todays_meetings, get_upcoming_meetings,
};
pub use health::{get_health, HealthReport};
pub use meetings::{
    create_meeting, delete_meeting, get_meeting, list_meetings, update_meeting,
    update_meeting_status, ListMeetingsRequest,
};
pub use status::run_status_sweep;
