//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for MeetSched
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MeetSchedError {
    /// The referenced meeting does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad interval ordering, past start, conflicting interval or an illegal
    /// manual status transition.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authorization failure, mutation of a terminal meeting or deletion of an
    /// ongoing one.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Storage-level exclusion violation reported by a repository.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MeetSchedError {
    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for MeetSched operations
pub type Result<T> = std::result::Result<T, MeetSchedError>;
