//! Meeting status state machine and the time-driven sweep.
//!
//! | From                 | To        | Trigger                          |
//! |----------------------|-----------|----------------------------------|
//! | Scheduled            | Ongoing   | `start <= now < end`             |
//! | Scheduled            | Completed | `now >= end` (ongoing window missed) |
//! | Ongoing              | Completed | `now >= end`                     |
//! | Scheduled or Ongoing | Cancelled | explicit user action only        |
//! | Completed, Cancelled | none      | rejected with `Forbidden`        |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meetsched_domain::{
    BulkStatusUpdate, Meeting, MeetSchedError, MeetingStatus, Result, SweepCondition, SweepReport,
};
use tracing::{debug, info, instrument};

use super::ports::MeetingRepository;
use crate::clock::Clock;

/// Applies the transition table and runs the periodic status sweep.
pub struct StatusTransitionEngine {
    repository: Arc<dyn MeetingRepository>,
    clock: Arc<dyn Clock>,
}

impl StatusTransitionEngine {
    pub fn new(repository: Arc<dyn MeetingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Validate any transition against the table.
    ///
    /// Terminal sources fail with `Forbidden`; edges missing from the table
    /// fail with `Validation`.
    pub fn check_transition(from: MeetingStatus, to: MeetingStatus) -> Result<()> {
        if from.is_terminal() {
            return Err(MeetSchedError::Forbidden(format!(
                "Meeting is {from}; its status can no longer change"
            )));
        }
        if !from.can_transition_to(to) {
            return Err(MeetSchedError::Validation(format!(
                "Illegal status transition from {from} to {to}"
            )));
        }
        Ok(())
    }

    /// Validate a transition requested by a user. Only cancellation is
    /// accepted; clock-driven targets fail with `Validation`.
    pub fn check_manual_transition(from: MeetingStatus, to: MeetingStatus) -> Result<()> {
        Self::check_transition(from, to)?;
        if !from.allows_manual_transition_to(to) {
            return Err(MeetSchedError::Validation(format!(
                "Status {to} is set automatically and cannot be requested manually"
            )));
        }
        Ok(())
    }

    /// Status the sweep would write for `meeting` at `now`, if any.
    pub fn time_driven_status(meeting: &Meeting, now: DateTime<Utc>) -> Option<MeetingStatus> {
        match meeting.status {
            MeetingStatus::Scheduled | MeetingStatus::Ongoing if meeting.has_ended_by(now) => {
                Some(MeetingStatus::Completed)
            }
            MeetingStatus::Scheduled if meeting.is_in_progress_at(now) => {
                Some(MeetingStatus::Ongoing)
            }
            _ => None,
        }
    }

    /// The two bulk updates of one sweep, both evaluated at `now`.
    ///
    /// The predicates are disjoint (`now < end` vs `end <= now`), so a meeting
    /// is written at most once per sweep regardless of execution order.
    pub fn sweep_plan(now: DateTime<Utc>) -> [BulkStatusUpdate; 2] {
        [
            BulkStatusUpdate {
                from: vec![MeetingStatus::Scheduled],
                condition: SweepCondition::InProgressAt(now),
                to: MeetingStatus::Ongoing,
            },
            BulkStatusUpdate {
                from: MeetingStatus::OPEN.to_vec(),
                condition: SweepCondition::EndedBy(now),
                to: MeetingStatus::Completed,
            },
        ]
    }

    /// Advance every meeting whose interval says it should have moved on.
    ///
    /// Idempotent: a second run at the same instant writes nothing. Each bulk
    /// update is atomic; if the second one fails the first stays applied and
    /// the error is returned to the trigger.
    #[instrument(skip(self))]
    pub async fn run_sweep(&self) -> Result<SweepReport> {
        let now = self.clock.now();
        let [to_ongoing, to_completed] = Self::sweep_plan(now);

        let started = self.repository.bulk_update_status(&to_ongoing).await?;
        debug!(started, "sweep: scheduled meetings now in progress");

        let completed = self.repository.bulk_update_status(&to_completed).await?;
        debug!(completed, "sweep: ended meetings completed");

        let report = SweepReport { swept_at: now, started, completed };
        if report.total_written() > 0 {
            info!(started, completed, swept_at = %now, "meeting status sweep applied");
        }
        Ok(report)
    }
}
