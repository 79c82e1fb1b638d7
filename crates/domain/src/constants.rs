//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Field limits
pub const TITLE_MIN_LENGTH: usize = 3;
pub const TITLE_MAX_LENGTH: usize = 200;
pub const DESCRIPTION_MIN_LENGTH: usize = 10;

// Query limits
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;
pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

// Scheduling defaults
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_SWEEP_CRON: &str = "0 * * * * *"; // every minute
pub const DEFAULT_SWEEP_TIMEOUT_SECS: u64 = 60;

// Messages shared by the service and storage adapters
pub const TERMINAL_UPDATE_MESSAGE: &str = "Cannot update a completed or cancelled meeting";
