//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SWEEP_CRON, DEFAULT_SWEEP_TIMEOUT_SECS, DEFAULT_TIMEZONE, DEFAULT_UPCOMING_LIMIT,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "meetsched.db".to_string(), pool_size: default_pool_size() }
    }
}

/// Scheduling configuration
///
/// `timezone` is the canonical IANA zone used to compute "today" boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_sweep_cron")]
    pub sweep_cron: String,
    #[serde(default = "default_true")]
    pub sweep_enabled: bool,
    #[serde(default = "default_sweep_timeout")]
    pub sweep_timeout_secs: u64,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            sweep_cron: default_sweep_cron(),
            sweep_enabled: true,
            sweep_timeout_secs: default_sweep_timeout(),
            upcoming_limit: default_upcoming_limit(),
        }
    }
}

fn default_pool_size() -> u32 {
    8
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_sweep_cron() -> String {
    DEFAULT_SWEEP_CRON.to_string()
}

fn default_true() -> bool {
    true
}

fn default_sweep_timeout() -> u64 {
    DEFAULT_SWEEP_TIMEOUT_SECS
}

fn default_upcoming_limit() -> usize {
    DEFAULT_UPCOMING_LIMIT
}
