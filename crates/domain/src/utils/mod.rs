//! Pure domain utilities

pub mod validation;
