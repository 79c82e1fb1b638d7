//! Scheduling use cases: create, update, set status, delete and lookups.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use meetsched_domain::constants::TERMINAL_UPDATE_MESSAGE;
use meetsched_domain::{
    validate_description, validate_meeting_url, validate_title, Actor, Meeting, MeetSchedError,
    MeetingDraft, MeetingPage, MeetingPatch, MeetingQuery, MeetingStatus, NewMeeting, PageRequest,
    Result,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

use super::conflict::find_conflict;
use super::ports::{Authorizer, MeetingRepository};
use super::status::StatusTransitionEngine;
use crate::clock::Clock;

const CREATE_CONFLICT_MESSAGE: &str = "You have another meeting scheduled during this time";
const UPDATE_CONFLICT_MESSAGE: &str = "This time conflicts with another scheduled meeting";

/// Coordinates validation, conflict detection, authorization and
/// persistence for meeting mutations.
///
/// Creates and time-changing updates hold a per-creator lock across the
/// read-check-write sequence, so two overlapping requests for the same
/// creator cannot both pass the conflict check in this process.
pub struct SchedulingService {
    repository: Arc<dyn MeetingRepository>,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn Clock>,
    creator_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SchedulingService {
    pub fn new(
        repository: Arc<dyn MeetingRepository>,
        authorizer: Arc<dyn Authorizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, authorizer, clock, creator_locks: DashMap::new() }
    }

    /// Schedule a new meeting for `creator_id`.
    #[instrument(skip(self, input), fields(creator_id = %creator_id))]
    pub async fn create(&self, creator_id: &str, input: NewMeeting) -> Result<Meeting> {
        let title = validate_title(&input.title)?;
        let description = validate_description(input.description.as_deref())?;
        let meeting_url = validate_meeting_url(input.meeting_url.as_deref())?;

        ensure_ordered(input.start_time, input.end_time)?;
        if input.start_time < self.clock.now() {
            return Err(MeetSchedError::Validation("Start time cannot be in the past".into()));
        }

        let _guard = self.lock_creator(creator_id).await;
        self.ensure_no_conflict(
            creator_id,
            input.start_time,
            input.end_time,
            None,
            CREATE_CONFLICT_MESSAGE,
        )
        .await?;

        let draft = MeetingDraft {
            title,
            description,
            meeting_url,
            start_time: input.start_time,
            end_time: input.end_time,
            status: MeetingStatus::Scheduled,
            creator_id: creator_id.to_string(),
        };
        let meeting = self
            .repository
            .create(draft)
            .await
            .map_err(|err| storage_conflict_as_validation(err, CREATE_CONFLICT_MESSAGE))?;

        info!(meeting_id = %meeting.id, start = %meeting.start_time, end = %meeting.end_time, "meeting created");
        Ok(meeting)
    }

    /// Apply `patch` to a non-terminal meeting.
    #[instrument(skip(self, patch), fields(actor_id = %actor.id))]
    pub async fn update(&self, id: &str, actor: &Actor, patch: MeetingPatch) -> Result<Meeting> {
        let meeting = self.get_by_id(id).await?;
        self.ensure_can_mutate(actor, &meeting).await?;

        if meeting.status.is_terminal() {
            return Err(MeetSchedError::Forbidden(TERMINAL_UPDATE_MESSAGE.into()));
        }

        let patch = MeetingPatch {
            title: patch.title.as_deref().map(validate_title).transpose()?,
            description: validate_description(patch.description.as_deref())?,
            meeting_url: validate_meeting_url(patch.meeting_url.as_deref())?,
            start_time: patch.start_time,
            end_time: patch.end_time,
        };

        let start = patch.start_time.unwrap_or(meeting.start_time);
        let end = patch.end_time.unwrap_or(meeting.end_time);
        ensure_ordered(start, end)?;

        let _guard = if patch.touches_schedule() {
            let guard = self.lock_creator(&meeting.creator_id).await;
            self.ensure_no_conflict(
                &meeting.creator_id,
                start,
                end,
                Some(&meeting.id),
                UPDATE_CONFLICT_MESSAGE,
            )
            .await?;
            Some(guard)
        } else {
            None
        };

        let updated = self
            .repository
            .update(id, &patch)
            .await
            .map_err(|err| storage_conflict_as_validation(err, UPDATE_CONFLICT_MESSAGE))?;

        info!(meeting_id = %updated.id, rescheduled = patch.touches_schedule(), "meeting updated");
        Ok(updated)
    }

    /// Apply an explicit status change. Only cancellation of a scheduled or
    /// ongoing meeting is accepted.
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn set_status(
        &self,
        id: &str,
        actor: &Actor,
        new_status: MeetingStatus,
    ) -> Result<Meeting> {
        let meeting = self.get_by_id(id).await?;
        self.ensure_can_mutate(actor, &meeting).await?;
        StatusTransitionEngine::check_manual_transition(meeting.status, new_status)?;

        let updated = self
            .repository
            .transition_status(id, meeting.status, new_status)
            .await
            .map_err(|err| match err {
                MeetSchedError::Conflict(_) => MeetSchedError::Validation(format!(
                    "Meeting {id} changed status concurrently; reload and retry"
                )),
                other => other,
            })?;

        info!(meeting_id = %id, from = %meeting.status, to = %updated.status, "meeting status changed");
        Ok(updated)
    }

    /// Delete a meeting unless it is in progress.
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn delete(&self, id: &str, actor: &Actor) -> Result<()> {
        let meeting = self.get_by_id(id).await?;
        self.ensure_can_mutate(actor, &meeting).await?;

        if meeting.status == MeetingStatus::Ongoing {
            return Err(MeetSchedError::Forbidden("Cannot delete an ongoing meeting".into()));
        }

        self.repository.delete(id).await?;
        info!(meeting_id = %id, "meeting deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Meeting> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| MeetSchedError::NotFound(format!("Meeting {id} not found")))
    }

    /// Filtered, sorted and paginated listing.
    #[instrument(skip(self, query))]
    pub async fn list(&self, query: MeetingQuery, page: PageRequest) -> Result<MeetingPage> {
        let page = page.normalized();
        let total = self.repository.count(&query).await?;

        let query = MeetingQuery { limit: Some(page.limit), offset: page.offset()?, ..query };
        let items = self.repository.find(&query).await?;
        debug!(total, returned = items.len(), page = page.page, "meetings listed");

        let limit = page.limit as u64;
        Ok(MeetingPage {
            items,
            page: page.page,
            limit: page.limit,
            total,
            total_pages: total.div_ceil(limit),
        })
    }

    async fn ensure_can_mutate(&self, actor: &Actor, meeting: &Meeting) -> Result<()> {
        if self.authorizer.can_mutate(actor, meeting).await? {
            return Ok(());
        }
        warn!(actor_id = %actor.id, meeting_id = %meeting.id, "meeting mutation denied");
        Err(MeetSchedError::Forbidden("You do not have permission to modify this meeting".into()))
    }

    async fn ensure_no_conflict(
        &self,
        creator_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
        message: &str,
    ) -> Result<()> {
        let query = MeetingQuery::conflict_candidates(creator_id, start, end, exclude_id);
        let existing = self.repository.find(&query).await?;

        if let Some(blocking) = find_conflict(creator_id, start, end, &existing, exclude_id) {
            debug!(blocking_id = %blocking.id, "scheduling conflict detected");
            return Err(MeetSchedError::Validation(message.to_string()));
        }
        Ok(())
    }

    async fn lock_creator(&self, creator_id: &str) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(&*self.creator_locks.entry(creator_id.to_string()).or_default());
        lock.lock_owned().await
    }
}

fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start >= end {
        return Err(MeetSchedError::Validation("End time must be after start time".into()));
    }
    Ok(())
}

fn storage_conflict_as_validation(err: MeetSchedError, message: &str) -> MeetSchedError {
    match err {
        MeetSchedError::Conflict(_) => MeetSchedError::Validation(message.to_string()),
        other => other,
    }
}
