//! Meeting scheduling and lifecycle management
//!
//! - [`conflict`]: half-open interval conflict detection per creator
//! - [`status`]: transition table and the time-driven status sweep
//! - [`calendar`]: range, upcoming, today and statistics queries
//! - [`service`]: create/update/set-status/delete use cases
//! - [`ports`]: repository and authorization boundaries

pub mod authorization;
pub mod calendar;
pub mod conflict;
pub mod ports;
pub mod service;
pub mod status;
