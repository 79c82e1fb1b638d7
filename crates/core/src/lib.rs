//! # MeetSched Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for persistence, authorization and time
//! - Conflict detection and the meeting status state machine
//! - Calendar queries and the scheduling use cases
//!
//! ## Architecture Principles
//! - Only depends on `meetsched-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod clock;
pub mod scheduling;

pub use clock::{Clock, MockClock, SystemClock};
pub use scheduling::authorization::CreatorOrAdmin;
pub use scheduling::calendar::{parse_timezone, CalendarQueryService};
pub use scheduling::conflict::{find_conflict, has_conflict, intervals_overlap};
pub use scheduling::ports::{Authorizer, MeetingRepository};
pub use scheduling::service::SchedulingService;
pub use scheduling::status::StatusTransitionEngine;
