//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when `MEETSCHED_DB_PATH` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. Otherwise built-in defaults
//!
//! Every loaded configuration passes through [`validate`].
//!
//! ## Environment Variables
//! - `MEETSCHED_DB_PATH`: Database file path (required for env loading)
//! - `MEETSCHED_DB_POOL_SIZE`: Connection pool size
//! - `MEETSCHED_TIMEZONE`: IANA zone used for "today" boundaries
//! - `MEETSCHED_SWEEP_CRON`: Six-field cron expression for the status sweep
//! - `MEETSCHED_SWEEP_ENABLED`: Whether the sweep runs (true/false)
//! - `MEETSCHED_SWEEP_TIMEOUT_SECS`: Per-run sweep timeout
//!
//! ## File Locations
//! `config.{json,toml}` and `meetsched.{json,toml}` in the working directory,
//! its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use meetsched_core::parse_timezone;
use meetsched_domain::{Config, DatabaseConfig, MeetSchedError, Result, SchedulingConfig};

const FILE_NAMES: [&str; 4] = ["config.json", "config.toml", "meetsched.json", "meetsched.toml"];

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `MeetSchedError::Config` if a present source is malformed or the
/// resulting configuration fails validation.
pub fn load() -> Result<Config> {
    let config = if std::env::var_os("MEETSCHED_DB_PATH").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else if let Some(path) = probe_config_paths() {
        load_from_file(Some(path))?
    } else {
        tracing::info!("No configuration found, using defaults");
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables.
///
/// `MEETSCHED_DB_PATH` is required; every other variable falls back to its
/// default when unset.
///
/// # Errors
/// Returns `MeetSchedError::Config` if the path is missing or a value does
/// not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = SchedulingConfig::default();

    let database = DatabaseConfig {
        path: env_var("MEETSCHED_DB_PATH")?,
        pool_size: env_parse("MEETSCHED_DB_POOL_SIZE", DatabaseConfig::default().pool_size)?,
    };

    let scheduling = SchedulingConfig {
        timezone: std::env::var("MEETSCHED_TIMEZONE").unwrap_or(defaults.timezone),
        sweep_cron: std::env::var("MEETSCHED_SWEEP_CRON").unwrap_or(defaults.sweep_cron),
        sweep_enabled: env_bool("MEETSCHED_SWEEP_ENABLED", defaults.sweep_enabled),
        sweep_timeout_secs: env_parse("MEETSCHED_SWEEP_TIMEOUT_SECS", defaults.sweep_timeout_secs)?,
        upcoming_limit: defaults.upcoming_limit,
    };

    Ok(Config { database, scheduling })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations. JSON and TOML are
/// supported, detected by file extension.
///
/// # Errors
/// Returns `MeetSchedError::Config` if the file is missing or malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MeetSchedError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MeetSchedError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MeetSchedError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Check values serde cannot: the timezone must be a known IANA name, the
/// pool must hold a connection and the sweep needs a schedule.
pub fn validate(config: &Config) -> Result<()> {
    parse_timezone(&config.scheduling.timezone)?;

    if config.database.pool_size == 0 {
        return Err(MeetSchedError::Config("Database pool size must be at least 1".into()));
    }
    if config.scheduling.sweep_enabled && config.scheduling.sweep_cron.trim().is_empty() {
        return Err(MeetSchedError::Config("Sweep cron expression is empty".into()));
    }
    if config.scheduling.sweep_timeout_secs == 0 {
        return Err(MeetSchedError::Config("Sweep timeout must be at least 1 second".into()));
    }
    Ok(())
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MeetSchedError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MeetSchedError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(MeetSchedError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        MeetSchedError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| MeetSchedError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
