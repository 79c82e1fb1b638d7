//! Status sweep commands

use meetsched_domain::types::SweepReport;
use meetsched_domain::Result;

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

/// Run one status sweep immediately, outside the cron schedule.
pub async fn run_status_sweep(ctx: &AppContext) -> Result<SweepReport> {
    execute_command("status::run_status_sweep", || ctx.status.run_sweep()).await
}
