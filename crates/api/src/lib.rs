//! # MeetSched App
//!
//! Application layer: command surface, dependency wiring and process
//! lifecycle.
//!
//! This crate contains:
//! - Commands (thin, logged entry points over the core services)
//! - Application context (dependency injection)
//! - Logging setup shared by the binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
