//! Port interfaces for meeting scheduling
//!
//! These traits define the boundaries between the scheduling logic and the
//! infrastructure that stores meetings and resolves permissions.

use async_trait::async_trait;
use meetsched_domain::{
    Actor, BulkStatusUpdate, Meeting, MeetingDraft, MeetingPatch, MeetingQuery, MeetingStatus,
    Result,
};

/// Persistence for meetings.
///
/// Every method is a single atomic round trip. Adapters select rows with the
/// same semantics as [`MeetingQuery::matches`] and [`BulkStatusUpdate::matches`].
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Look up a meeting by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Meeting>>;

    /// Filtered, sorted and paged query.
    async fn find(&self, query: &MeetingQuery) -> Result<Vec<Meeting>>;

    /// Number of meetings matching the filter. `limit` and `offset` are
    /// ignored.
    async fn count(&self, query: &MeetingQuery) -> Result<u64>;

    /// Persist a new meeting, assigning its id and audit timestamps.
    ///
    /// Adapters that enforce the per-creator exclusion constraint themselves
    /// report a violation as `MeetSchedError::Conflict`.
    async fn create(&self, draft: MeetingDraft) -> Result<Meeting>;

    /// Apply the populated fields of `patch` while the stored status is still
    /// `Scheduled` or `Ongoing`. Missing ids are `NotFound`; a meeting that
    /// has already reached a terminal status is `Forbidden` and left as is.
    async fn update(&self, id: &str, patch: &MeetingPatch) -> Result<Meeting>;

    /// Compare-and-set the status: succeeds only while the stored status is
    /// still `expected`, otherwise `MeetSchedError::Conflict`.
    async fn transition_status(
        &self,
        id: &str,
        expected: MeetingStatus,
        to: MeetingStatus,
    ) -> Result<Meeting>;

    /// Delete a meeting. Missing ids are `NotFound`.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Atomically set the status of every matching meeting and return how
    /// many rows were written.
    async fn bulk_update_status(&self, update: &BulkStatusUpdate) -> Result<usize>;
}

/// Decides whether an actor may mutate a meeting.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn can_mutate(&self, actor: &Actor, meeting: &Meeting) -> Result<bool>;
}
