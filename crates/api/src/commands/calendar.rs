//! Calendar view commands

use chrono::{DateTime, Utc};
use meetsched_domain::types::{CalendarEvent, Meeting, MeetingStatistics, TimeWindow};
use meetsched_domain::Result;
use tracing::info;

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

/// Meetings intersecting `[start_date, end_date]` for the calendar grid.
pub async fn get_calendar_events(
    ctx: &AppContext,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    creator_id: Option<&str>,
) -> Result<Vec<CalendarEvent>> {
    let command_name = "calendar::get_calendar_events";
    info!(command = command_name, %start_date, %end_date, "fetching calendar events");

    let window = TimeWindow::inclusive(start_date, end_date);
    execute_command(command_name, || ctx.calendar.get_events(window, creator_id)).await
}

/// Upcoming meetings. `limit` falls back to the configured default.
pub async fn get_upcoming_meetings(
    ctx: &AppContext,
    creator_id: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<Meeting>> {
    let limit = limit.unwrap_or(ctx.config.scheduling.upcoming_limit);
    execute_command("calendar::get_upcoming_meetings", || {
        ctx.calendar.get_upcoming(creator_id, limit)
    })
    .await
}

pub async fn get_todays_meetings(
    ctx: &AppContext,
    creator_id: Option<&str>,
) -> Result<Vec<Meeting>> {
    execute_command("calendar::get_todays_meetings", || ctx.calendar.get_today(creator_id)).await
}

pub async fn get_meeting_statistics(
    ctx: &AppContext,
    creator_id: Option<&str>,
) -> Result<MeetingStatistics> {
    execute_command("calendar::get_meeting_statistics", || {
        ctx.calendar.get_statistics(creator_id)
    })
    .await
}
