//! # MeetSched Domain
//!
//! Business domain types and models for meeting scheduling.
//!
//! This crate contains:
//! - The `Meeting` entity and its status state machine
//! - Typed query, patch and statistics models
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Field validation rules shared by every entry point
//!
//! ## Architecture
//! - No dependencies on other MeetSched crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::validation::{validate_description, validate_meeting_url, validate_title};
