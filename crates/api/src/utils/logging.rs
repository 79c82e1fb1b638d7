use std::time::Duration;

use meetsched_domain::MeetSchedError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    error_type: Option<&'static str>,
) {
    let duration_ms = elapsed.as_millis() as u64;

    match error_type {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error_type) => {
            warn!(command, duration_ms, error_type, "command_execution_failure");
        }
    }
}

/// Stable label for a domain error, suitable for logging.
#[inline]
pub fn error_label(error: &MeetSchedError) -> &'static str {
    error.label()
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` selects the filter (default `info`). Setting
/// `MEETSCHED_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("MEETSCHED_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = if json { builder.json().try_init() } else { builder.try_init() };

    if let Err(err) = result {
        warn!(error = %err, "tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_label_is_stable() {
        assert_eq!(error_label(&MeetSchedError::Forbidden("x".into())), "forbidden");
        assert_eq!(error_label(&MeetSchedError::Validation("x".into())), "validation");
    }
}
