//! Conflict detection between a candidate interval and a creator's meetings.
//!
//! Intervals are half-open: `[start, end)`. A meeting ending exactly when
//! another starts does not conflict with it. The functions here are pure
//! predicates over data the caller already fetched and are safe to call from
//! any thread.

use chrono::{DateTime, Utc};
use meetsched_domain::Meeting;

/// `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// First meeting in `existing` that blocks `[start, end)` for `creator_id`.
///
/// Only meetings owned by `creator_id`, not cancelled, and not `exclude_id`
/// participate.
pub fn find_conflict<'a>(
    creator_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: &'a [Meeting],
    exclude_id: Option<&str>,
) -> Option<&'a Meeting> {
    existing.iter().find(|meeting| {
        meeting.creator_id == creator_id
            && meeting.is_active()
            && exclude_id != Some(meeting.id.as_str())
            && intervals_overlap(start, end, meeting.start_time, meeting.end_time)
    })
}

/// Whether `[start, end)` overlaps any of the creator's active meetings.
pub fn has_conflict(
    creator_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: &[Meeting],
    exclude_id: Option<&str>,
) -> bool {
    find_conflict(creator_id, start, end, existing, exclude_id).is_some()
}
