//! Domain types and models

pub mod meeting;
pub mod query;
pub mod stats;

pub use meeting::{
    Actor, ActorRole, CalendarEvent, Meeting, MeetingDraft, MeetingPatch, MeetingStatus, NewMeeting,
};
pub use query::{
    BulkStatusUpdate, MeetingPage, MeetingQuery, MeetingSort, PageRequest, SortField, SortOrder,
    SweepCondition, TimeWindow,
};
pub use stats::{MeetingStatistics, SweepReport};
