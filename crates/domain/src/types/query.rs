//! Typed query, sort and bulk-update models for the meeting repository

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::errors::{MeetSchedError, Result};
use crate::impl_domain_status_conversions;
use crate::types::meeting::{Meeting, MeetingStatus};

/// A time window tested against half-open meeting intervals.
///
/// The window start is always inclusive. The window end is inclusive for
/// calendar range queries and exclusive for day boundaries and conflict
/// lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub inclusive_end: bool,
}

impl TimeWindow {
    /// `[start, end]`
    pub fn inclusive(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end, inclusive_end: true }
    }

    /// `[start, end)`
    pub fn half_open(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end, inclusive_end: false }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Whether the meeting interval `[start, end)` intersects this window.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let starts_before_window_end =
            if self.inclusive_end { start <= self.end } else { start < self.end };
        starts_before_window_end && self.start < end
    }
}

/// Sortable meeting columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    StartTime,
    EndTime,
    CreatedAt,
    Title,
}

impl_domain_status_conversions!(SortField {
    StartTime => "START_TIME",
    EndTime => "END_TIME",
    CreatedAt => "CREATED_AT",
    Title => "TITLE",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl_domain_status_conversions!(SortOrder {
    Asc => "ASC",
    Desc => "DESC",
});

/// Sort key and direction. Ties are always broken by ascending id so results are
/// deterministic across adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl MeetingSort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn compare(&self, a: &Meeting, b: &Meeting) -> Ordering {
        let primary = match self.field {
            SortField::StartTime => a.start_time.cmp(&b.start_time),
            SortField::EndTime => a.end_time.cmp(&b.end_time),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Title => a.title.cmp(&b.title),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Typed filter passed to the repository.
///
/// Every populated field narrows the result (logical AND). An empty
/// `statuses` list matches any status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingQuery {
    pub creator_id: Option<String>,
    pub statuses: Vec<MeetingStatus>,
    pub exclude_id: Option<String>,
    pub overlapping: Option<TimeWindow>,
    /// `start_time >= starts_from`
    pub starts_from: Option<DateTime<Utc>>,
    /// `start_time <= starts_until`
    pub starts_until: Option<DateTime<Utc>>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    pub sort: MeetingSort,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl MeetingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active meetings of `creator_id` that could collide with `[start, end)`.
    pub fn conflict_candidates(
        creator_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Self {
        Self {
            creator_id: Some(creator_id.to_string()),
            statuses: MeetingStatus::ACTIVE.to_vec(),
            exclude_id: exclude_id.map(str::to_string),
            overlapping: Some(TimeWindow::half_open(start, end)),
            ..Self::default()
        }
    }

    pub fn for_creator(mut self, creator_id: Option<&str>) -> Self {
        self.creator_id = creator_id.map(str::to_string);
        self
    }

    pub fn with_statuses(mut self, statuses: &[MeetingStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn overlapping(mut self, window: TimeWindow) -> Self {
        self.overlapping = Some(window);
        self
    }

    pub fn starting_from(mut self, from: DateTime<Utc>) -> Self {
        self.starts_from = Some(from);
        self
    }

    pub fn sorted_by(mut self, sort: MeetingSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limited_to(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reference predicate. Storage adapters must select exactly the meetings
    /// for which this returns true.
    pub fn matches(&self, meeting: &Meeting) -> bool {
        if let Some(creator_id) = &self.creator_id {
            if &meeting.creator_id != creator_id {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&meeting.status) {
            return false;
        }
        if self.exclude_id.as_deref() == Some(meeting.id.as_str()) {
            return false;
        }
        if let Some(window) = &self.overlapping {
            if !window.intersects(meeting.start_time, meeting.end_time) {
                return false;
            }
        }
        if self.starts_from.is_some_and(|from| meeting.start_time < from) {
            return false;
        }
        if self.starts_until.is_some_and(|until| meeting.start_time > until) {
            return false;
        }
        if let Some(needle) = self.search.as_deref().map(str::to_lowercase) {
            let in_title = meeting.title.to_lowercase().contains(&needle);
            let in_description = meeting
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }

    /// Filter, sort and page an in-memory collection with this query.
    pub fn apply<'a, I>(&self, meetings: I) -> Vec<Meeting>
    where
        I: IntoIterator<Item = &'a Meeting>,
    {
        let mut selected: Vec<Meeting> =
            meetings.into_iter().filter(|m| self.matches(m)).cloned().collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));

        let limit = self.limit.unwrap_or(usize::MAX);
        selected.into_iter().skip(self.offset).take(limit).collect()
    }
}

/// Page number and size for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl PageRequest {
    /// Clamp to `page >= 1` and `1 <= limit <= MAX_PAGE_LIMIT`.
    pub fn normalized(self) -> Self {
        Self { page: self.page.max(1), limit: self.limit.clamp(1, MAX_PAGE_LIMIT) }
    }

    /// Rows to skip before this page. Pages past what a signed 64-bit
    /// offset can address are rejected.
    pub fn offset(&self) -> Result<usize> {
        self.page
            .saturating_sub(1)
            .checked_mul(self.limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| {
                MeetSchedError::Validation(format!("Page {} is out of range", self.page))
            })
    }
}

/// One page of meetings with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingPage {
    pub items: Vec<Meeting>,
    pub page: usize,
    pub limit: usize,
    pub total: u64,
    pub total_pages: u64,
}

/// Time predicate of a sweep bulk update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepCondition {
    /// `start_time <= now < end_time`
    InProgressAt(DateTime<Utc>),
    /// `end_time <= now`
    EndedBy(DateTime<Utc>),
}

impl SweepCondition {
    pub fn holds_for(&self, meeting: &Meeting) -> bool {
        match *self {
            Self::InProgressAt(now) => meeting.is_in_progress_at(now),
            Self::EndedBy(now) => meeting.has_ended_by(now),
        }
    }
}

/// "Set status to `to` for every meeting whose status is in `from` and whose
/// interval satisfies `condition`." Applied atomically by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusUpdate {
    pub from: Vec<MeetingStatus>,
    pub condition: SweepCondition,
    pub to: MeetingStatus,
}

impl BulkStatusUpdate {
    pub fn matches(&self, meeting: &Meeting) -> bool {
        self.from.contains(&meeting.status) && self.condition.holds_for(meeting)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn meeting(id: &str, creator: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Meeting {
        Meeting {
            id: id.into(),
            title: format!("Meeting {id}"),
            description: Some("Quarterly planning review".into()),
            meeting_url: None,
            start_time: start,
            end_time: end,
            status: MeetingStatus::Scheduled,
            creator_id: creator.into(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn inclusive_window_keeps_meetings_starting_at_its_end() {
        let window = TimeWindow::inclusive(at(9, 0), at(10, 0));
        assert!(window.intersects(at(10, 0), at(11, 0)));
        assert!(!window.intersects(at(8, 0), at(9, 0)));

        let half_open = TimeWindow::half_open(at(9, 0), at(10, 0));
        assert!(!half_open.intersects(at(10, 0), at(11, 0)));
    }

    #[test]
    fn conflict_candidates_skip_cancelled_and_self() {
        let query = MeetingQuery::conflict_candidates("a", at(10, 0), at(11, 0), Some("m-1"));

        let own = meeting("m-1", "a", at(10, 0), at(11, 0));
        let other = meeting("m-2", "a", at(10, 30), at(11, 30));
        let mut cancelled = meeting("m-3", "a", at(10, 0), at(11, 0));
        cancelled.status = MeetingStatus::Cancelled;
        let foreign = meeting("m-4", "b", at(10, 0), at(11, 0));

        assert!(!query.matches(&own));
        assert!(query.matches(&other));
        assert!(!query.matches(&cancelled));
        assert!(!query.matches(&foreign));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let m = meeting("m-1", "a", at(10, 0), at(11, 0));
        let mut query = MeetingQuery::new();

        query.search = Some("MEETING M-1".into());
        assert!(query.matches(&m));

        query.search = Some("planning".into());
        assert!(query.matches(&m));

        query.search = Some("retro".into());
        assert!(!query.matches(&m));
    }

    #[test]
    fn apply_sorts_then_pages() {
        let meetings = vec![
            meeting("c", "a", at(12, 0), at(13, 0)),
            meeting("a", "a", at(10, 0), at(11, 0)),
            meeting("b", "a", at(11, 0), at(12, 0)),
        ];

        let query = MeetingQuery { offset: 1, limit: Some(1), ..MeetingQuery::default() };
        let page = query.apply(&meetings);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "b");

        let desc = MeetingQuery::new()
            .sorted_by(MeetingSort::new(SortField::StartTime, SortOrder::Desc))
            .apply(&meetings);
        let ids: Vec<_> = desc.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn page_request_is_clamped() {
        let request = PageRequest { page: 0, limit: 1000 }.normalized();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 100);
        assert_eq!(PageRequest { page: 3, limit: 10 }.offset().unwrap(), 20);
    }

    #[test]
    fn offset_past_addressable_range_is_rejected() {
        let huge = PageRequest { page: usize::MAX, limit: 10 }.normalized();
        assert!(matches!(huge.offset(), Err(MeetSchedError::Validation(_))));

        let past_i64 = PageRequest { page: (i64::MAX as usize) / 10 + 2, limit: 10 };
        assert!(matches!(past_i64.offset(), Err(MeetSchedError::Validation(_))));
    }

    #[test]
    fn bulk_update_requires_status_and_condition() {
        let mut m = meeting("m-1", "a", at(10, 0), at(11, 0));
        let update = BulkStatusUpdate {
            from: vec![MeetingStatus::Scheduled],
            condition: SweepCondition::InProgressAt(at(10, 30)),
            to: MeetingStatus::Ongoing,
        };
        assert!(update.matches(&m));

        m.status = MeetingStatus::Cancelled;
        assert!(!update.matches(&m));
    }
}
