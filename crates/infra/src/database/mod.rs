//! Database implementations

pub mod manager;
pub mod meeting_repository;

pub use manager::{DbManager, SqliteConnection};
pub use meeting_repository::SqliteMeetingRepository;
