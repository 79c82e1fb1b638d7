//! Aggregate views over meetings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-status counts plus the upcoming/today views, all derived from the
/// same predicates as the corresponding calendar queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingStatistics {
    pub total_meetings: u64,
    pub scheduled_meetings: u64,
    pub ongoing_meetings: u64,
    pub completed_meetings: u64,
    pub cancelled_meetings: u64,
    pub upcoming_meetings: u64,
    pub todays_meetings: u64,
}

/// Outcome of one status sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub swept_at: DateTime<Utc>,
    /// Meetings moved `Scheduled -> Ongoing`.
    pub started: usize,
    /// Meetings moved to `Completed`.
    pub completed: usize,
}

impl SweepReport {
    pub fn total_written(&self) -> usize {
        self.started + self.completed
    }
}
