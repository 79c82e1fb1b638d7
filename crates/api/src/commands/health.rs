//! Health reporting

use meetsched_domain::Result;
use serde::{Deserialize, Serialize};

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub database: bool,
    pub sweeper_running: bool,
    pub timezone: String,
}

/// Probe the database and report background task state.
///
/// A failed database probe is reported in the body rather than as an error.
pub async fn get_health(ctx: &AppContext) -> Result<HealthReport> {
    execute_command("health::get_health", move || async move {
        let database = ctx.health_check().await.is_ok();
        Ok(HealthReport {
            database,
            sweeper_running: ctx.sweeper_running().await,
            timezone: ctx.calendar.timezone().name().to_string(),
        })
    })
    .await
}
