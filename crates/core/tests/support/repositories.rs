//! Mock repository implementations for testing
//!
//! Provides an in-memory `MeetingRepository`, a wrapper that interleaves
//! writes or injects storage conflicts, and a configurable authorizer,
//! enabling deterministic tests without database dependencies.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use meetsched_core::{Authorizer, MeetingRepository};
use meetsched_domain::constants::TERMINAL_UPDATE_MESSAGE;
use meetsched_domain::{
    Actor, BulkStatusUpdate, Meeting, MeetSchedError, MeetingDraft, MeetingPatch, MeetingQuery,
    MeetingStatus, Result as DomainResult,
};

/// In-memory mock for `MeetingRepository`.
///
/// Selection goes through `MeetingQuery::apply`, the same predicate storage
/// adapters are held to. Every successful write bumps `writes`. Reads and
/// inserts yield to the runtime first, so concurrent callers interleave the
/// way they would against real storage.
#[derive(Default, Clone)]
pub struct InMemoryMeetingRepository {
    meetings: Arc<Mutex<Vec<Meeting>>>,
    writes: Arc<AtomicUsize>,
    next_id: Arc<AtomicUsize>,
}

impl InMemoryMeetingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store directly, bypassing validation.
    pub fn seeded(meetings: Vec<Meeting>) -> Self {
        let repo = Self::new();
        *repo.lock() = meetings;
        repo
    }

    pub fn insert(&self, meeting: Meeting) {
        self.lock().push(meeting);
    }

    pub fn all(&self) -> Vec<Meeting> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Meeting> {
        self.lock().iter().find(|m| m.id == id).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Overwrite the stored status directly, bypassing the transition table.
    pub fn set_status(&self, id: &str, status: MeetingStatus) {
        if let Some(meeting) = self.lock().iter_mut().find(|m| m.id == id) {
            meeting.status = status;
        }
    }

    /// Synchronous form of `bulk_update_status`, for landing a sweep in the
    /// middle of another operation.
    pub fn apply_bulk(&self, update: &BulkStatusUpdate) -> usize {
        let now = Utc::now();
        let mut changed = 0;
        for meeting in self.lock().iter_mut().filter(|m| update.matches(m)) {
            meeting.status = update.to;
            meeting.updated_at = now;
            changed += 1;
        }
        if changed > 0 {
            self.record_write();
        }
        changed
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Meeting>> {
        self.meetings.lock().unwrap()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MeetingRepository for InMemoryMeetingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Meeting>> {
        Ok(self.get(id))
    }

    async fn find(&self, query: &MeetingQuery) -> DomainResult<Vec<Meeting>> {
        tokio::task::yield_now().await;
        Ok(query.apply(self.lock().iter()))
    }

    async fn count(&self, query: &MeetingQuery) -> DomainResult<u64> {
        Ok(self.lock().iter().filter(|m| query.matches(m)).count() as u64)
    }

    async fn create(&self, draft: MeetingDraft) -> DomainResult<Meeting> {
        tokio::task::yield_now().await;
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let meeting = Meeting {
            id: format!("mtg-{seq:04}"),
            title: draft.title,
            description: draft.description,
            meeting_url: draft.meeting_url,
            start_time: draft.start_time,
            end_time: draft.end_time,
            status: draft.status,
            creator_id: draft.creator_id,
            created_at: now,
            updated_at: now,
        };
        self.lock().push(meeting.clone());
        self.record_write();
        Ok(meeting)
    }

    async fn update(&self, id: &str, patch: &MeetingPatch) -> DomainResult<Meeting> {
        let mut meetings = self.lock();
        let meeting = meetings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| MeetSchedError::NotFound(format!("Meeting {id} not found")))?;

        if meeting.status.is_terminal() {
            return Err(MeetSchedError::Forbidden(TERMINAL_UPDATE_MESSAGE.into()));
        }
        if let Some(title) = &patch.title {
            meeting.title = title.clone();
        }
        if let Some(description) = &patch.description {
            meeting.description = Some(description.clone());
        }
        if let Some(url) = &patch.meeting_url {
            meeting.meeting_url = Some(url.clone());
        }
        if let Some(start) = patch.start_time {
            meeting.start_time = start;
        }
        if let Some(end) = patch.end_time {
            meeting.end_time = end;
        }
        meeting.updated_at = Utc::now();

        let updated = meeting.clone();
        drop(meetings);
        self.record_write();
        Ok(updated)
    }

    async fn transition_status(
        &self,
        id: &str,
        expected: MeetingStatus,
        to: MeetingStatus,
    ) -> DomainResult<Meeting> {
        let mut meetings = self.lock();
        let meeting = meetings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| MeetSchedError::NotFound(format!("Meeting {id} not found")))?;

        if meeting.status != expected {
            return Err(MeetSchedError::Conflict(format!(
                "Meeting {id} is {} not {expected}",
                meeting.status
            )));
        }
        meeting.status = to;
        meeting.updated_at = Utc::now();

        let updated = meeting.clone();
        drop(meetings);
        self.record_write();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let mut meetings = self.lock();
        let before = meetings.len();
        meetings.retain(|m| m.id != id);
        if meetings.len() == before {
            return Err(MeetSchedError::NotFound(format!("Meeting {id} not found")));
        }
        drop(meetings);
        self.record_write();
        Ok(())
    }

    async fn bulk_update_status(&self, update: &BulkStatusUpdate) -> DomainResult<usize> {
        Ok(self.apply_bulk(update))
    }
}

type LookupHook = Box<dyn FnOnce(&InMemoryMeetingRepository) + Send>;

/// Wraps `InMemoryMeetingRepository` to script what happens between a
/// service's read and its write.
///
/// `after_next_lookup` runs a hook once, right after the next `find_by_id`
/// returns its snapshot. `reject_writes_with_conflict` makes `create`,
/// `update` and `transition_status` fail the way an adapter enforcing the
/// exclusion constraint in storage would.
#[derive(Default)]
pub struct ScriptedMeetingRepository {
    pub inner: InMemoryMeetingRepository,
    after_lookup: Mutex<Option<LookupHook>>,
    conflict_on_write: AtomicBool,
}

impl ScriptedMeetingRepository {
    pub fn new(inner: InMemoryMeetingRepository) -> Self {
        Self { inner, ..Self::default() }
    }

    pub fn after_next_lookup(
        &self,
        hook: impl FnOnce(&InMemoryMeetingRepository) + Send + 'static,
    ) {
        *self.after_lookup.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn reject_writes_with_conflict(&self) {
        self.conflict_on_write.store(true, Ordering::SeqCst);
    }

    fn storage_conflict(&self) -> DomainResult<()> {
        if self.conflict_on_write.load(Ordering::SeqCst) {
            return Err(MeetSchedError::Conflict("meetings_no_overlap".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MeetingRepository for ScriptedMeetingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Meeting>> {
        let snapshot = self.inner.find_by_id(id).await?;
        let hook = self.after_lookup.lock().unwrap().take();
        if let Some(hook) = hook {
            hook(&self.inner);
        }
        Ok(snapshot)
    }

    async fn find(&self, query: &MeetingQuery) -> DomainResult<Vec<Meeting>> {
        self.inner.find(query).await
    }

    async fn count(&self, query: &MeetingQuery) -> DomainResult<u64> {
        self.inner.count(query).await
    }

    async fn create(&self, draft: MeetingDraft) -> DomainResult<Meeting> {
        self.storage_conflict()?;
        self.inner.create(draft).await
    }

    async fn update(&self, id: &str, patch: &MeetingPatch) -> DomainResult<Meeting> {
        self.storage_conflict()?;
        self.inner.update(id, patch).await
    }

    async fn transition_status(
        &self,
        id: &str,
        expected: MeetingStatus,
        to: MeetingStatus,
    ) -> DomainResult<Meeting> {
        self.storage_conflict()?;
        self.inner.transition_status(id, expected, to).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.inner.delete(id).await
    }

    async fn bulk_update_status(&self, update: &BulkStatusUpdate) -> DomainResult<usize> {
        self.inner.bulk_update_status(update).await
    }
}

/// Authorizer that grants or denies every request.
#[derive(Debug, Clone, Copy)]
pub struct FixedAuthorizer(pub bool);

#[async_trait]
impl Authorizer for FixedAuthorizer {
    async fn can_mutate(&self, _actor: &Actor, _meeting: &Meeting) -> DomainResult<bool> {
        Ok(self.0)
    }
}
