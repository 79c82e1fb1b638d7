//! Calendar read models: range, upcoming, today and statistics.
//!
//! "Today" is computed in one canonical timezone configured for the
//! deployment. Day bounds are fixed once per call, before querying.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use meetsched_domain::constants::MAX_PAGE_LIMIT;
use meetsched_domain::{
    CalendarEvent, Meeting, MeetSchedError, MeetingQuery, MeetingStatistics, MeetingStatus, Result,
    TimeWindow,
};
use tracing::{debug, instrument};

use super::ports::MeetingRepository;
use crate::clock::Clock;

/// Parse an IANA timezone name such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| MeetSchedError::Config(format!("Invalid timezone '{name}': {e}")))
}

/// Read-only calendar queries over the meeting repository.
pub struct CalendarQueryService {
    repository: Arc<dyn MeetingRepository>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl CalendarQueryService {
    pub fn new(
        repository: Arc<dyn MeetingRepository>,
        clock: Arc<dyn Clock>,
        timezone: Tz,
    ) -> Self {
        Self { repository, clock, timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Meetings intersecting the inclusive window `[window.start, window.end]`,
    /// ascending by start time.
    #[instrument(skip(self))]
    pub async fn get_events(
        &self,
        window: TimeWindow,
        creator_id: Option<&str>,
    ) -> Result<Vec<CalendarEvent>> {
        if !window.is_well_formed() {
            return Err(MeetSchedError::Validation("End date must be after start date".into()));
        }

        let window = TimeWindow::inclusive(window.start, window.end);
        let query = MeetingQuery::new().for_creator(creator_id).overlapping(window);
        let meetings = self.repository.find(&query).await?;
        debug!(count = meetings.len(), "calendar events loaded");

        Ok(meetings.into_iter().map(CalendarEvent::from).collect())
    }

    /// Scheduled or ongoing meetings starting at or after now, capped at
    /// `limit` (clamped to 1..=100).
    #[instrument(skip(self))]
    pub async fn get_upcoming(
        &self,
        creator_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Meeting>> {
        let query = self
            .upcoming_query(creator_id, self.clock.now())
            .limited_to(limit.clamp(1, MAX_PAGE_LIMIT));
        self.repository.find(&query).await
    }

    /// Meetings intersecting the current calendar day in the configured zone.
    #[instrument(skip(self))]
    pub async fn get_today(&self, creator_id: Option<&str>) -> Result<Vec<Meeting>> {
        let today = self.day_window(self.clock.now())?;
        let query = MeetingQuery::new().for_creator(creator_id).overlapping(today);
        self.repository.find(&query).await
    }

    /// Per-status counts plus upcoming and today, using one instant for all
    /// derived predicates.
    #[instrument(skip(self))]
    pub async fn get_statistics(&self, creator_id: Option<&str>) -> Result<MeetingStatistics> {
        let now = self.clock.now();
        let today = self.day_window(now)?;
        let base = MeetingQuery::new().for_creator(creator_id);

        let by_status = |status: MeetingStatus| base.clone().with_statuses(&[status]);
        let repo = &self.repository;

        Ok(MeetingStatistics {
            total_meetings: repo.count(&base).await?,
            scheduled_meetings: repo.count(&by_status(MeetingStatus::Scheduled)).await?,
            ongoing_meetings: repo.count(&by_status(MeetingStatus::Ongoing)).await?,
            completed_meetings: repo.count(&by_status(MeetingStatus::Completed)).await?,
            cancelled_meetings: repo.count(&by_status(MeetingStatus::Cancelled)).await?,
            upcoming_meetings: repo.count(&self.upcoming_query(creator_id, now)).await?,
            todays_meetings: repo.count(&base.clone().overlapping(today)).await?,
        })
    }

    /// `[start of today, start of tomorrow)` in the configured zone, as UTC.
    pub fn day_window(&self, now: DateTime<Utc>) -> Result<TimeWindow> {
        let local_date = now.with_timezone(&self.timezone).date_naive();
        let next_date = local_date.succ_opt().ok_or_else(|| {
            MeetSchedError::Internal(format!("No calendar day after {local_date}"))
        })?;

        Ok(TimeWindow::half_open(
            self.start_of_day(local_date)?,
            self.start_of_day(next_date)?,
        ))
    }

    fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
        // Zones with a DST jump at midnight have no local 00:00; the day then
        // starts at the first valid instant after it.
        (0..=3)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .find_map(|time| self.timezone.from_local_datetime(&date.and_time(time)).earliest())
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                MeetSchedError::Internal(format!(
                    "Cannot resolve start of {date} in {}",
                    self.timezone.name()
                ))
            })
    }

    fn upcoming_query(&self, creator_id: Option<&str>, now: DateTime<Utc>) -> MeetingQuery {
        MeetingQuery::new()
            .for_creator(creator_id)
            .with_statuses(&MeetingStatus::OPEN)
            .starting_from(now)
    }
}
