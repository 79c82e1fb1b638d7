//! Shared test helpers for `meetsched-core` integration tests.
//!
//! In-memory adapters and fixtures so scheduling tests can focus on
//! behaviour instead of wiring.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
