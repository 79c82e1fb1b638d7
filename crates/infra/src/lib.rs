//! # MeetSched Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The SQLite meeting repository and connection pool
//! - Configuration loading from environment and files
//! - The cron-driven status sweep scheduler
//!
//! ## Architecture
//! - Implements traits defined in `meetsched-core`
//! - Contains all "impure" code (I/O, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteMeetingRepository};
pub use errors::InfraError;
pub use scheduling::{SchedulerError, SweepScheduler, SweepSchedulerConfig};
