//! `SchedulingService` against writes that land between its read and its
//! write, and against storage that enforces exclusion on its own.

mod support;

use std::sync::Arc;

use meetsched_core::{
    Authorizer, CreatorOrAdmin, MeetingRepository, MockClock, SchedulingService,
    StatusTransitionEngine,
};
use meetsched_domain::{
    Actor, ActorRole, MeetSchedError, Meeting, MeetingPatch, MeetingQuery, MeetingStatus,
    NewMeeting, PageRequest,
};
use support::fixtures::{admin, alice, at, stored, ALICE};
use support::repositories::{
    FixedAuthorizer, InMemoryMeetingRepository, ScriptedMeetingRepository,
};

struct Scripted {
    repo: Arc<ScriptedMeetingRepository>,
    scheduling: SchedulingService,
}

impl Scripted {
    fn new(seed: Vec<Meeting>, now_hour: u32) -> Self {
        Self::with_authorizer(seed, now_hour, Arc::new(CreatorOrAdmin))
    }

    fn with_authorizer(
        seed: Vec<Meeting>,
        now_hour: u32,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let repo =
            Arc::new(ScriptedMeetingRepository::new(InMemoryMeetingRepository::seeded(seed)));
        let clock = Arc::new(MockClock::new(at(now_hour, 0)));
        let shared: Arc<dyn MeetingRepository> = repo.clone();
        Self { scheduling: SchedulingService::new(shared, authorizer, clock), repo }
    }
}

fn assert_validation<T: std::fmt::Debug>(result: meetsched_domain::Result<T>, message: &str) {
    match result {
        Err(MeetSchedError::Validation(actual)) => assert_eq!(actual, message),
        other => panic!("expected validation error {message:?}, got {other:?}"),
    }
}

#[tokio::test]
async fn update_after_sweep_completed_the_meeting_is_forbidden() {
    let s = Scripted::new(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Ongoing)],
        11,
    );
    s.repo.after_next_lookup(|store| {
        for update in StatusTransitionEngine::sweep_plan(at(11, 0)) {
            store.apply_bulk(&update);
        }
    });

    let patch =
        MeetingPatch { title: Some("Rewritten after completion".into()), ..Default::default() };
    let result = s.scheduling.update("m", &alice(), patch).await;

    match result {
        Err(MeetSchedError::Forbidden(message)) => {
            assert_eq!(message, "Cannot update a completed or cancelled meeting");
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
    let stored = s.repo.inner.get("m").unwrap();
    assert_eq!(stored.status, MeetingStatus::Completed);
    assert_eq!(stored.title, "Meeting m");
}

#[tokio::test]
async fn reschedule_after_concurrent_cancel_is_forbidden() {
    let s = Scripted::new(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Scheduled)],
        8,
    );
    s.repo.after_next_lookup(|store| store.set_status("m", MeetingStatus::Cancelled));

    let patch = MeetingPatch {
        start_time: Some(at(12, 0)),
        end_time: Some(at(13, 0)),
        ..Default::default()
    };
    let result = s.scheduling.update("m", &alice(), patch).await;

    assert!(matches!(result, Err(MeetSchedError::Forbidden(_))), "got {result:?}");
    assert_eq!(s.repo.inner.get("m").unwrap().start_time, at(10, 0));
}

#[tokio::test]
async fn cancel_racing_the_sweep_reports_a_retryable_validation_error() {
    let s = Scripted::new(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Scheduled)],
        10,
    );
    s.repo.after_next_lookup(|store| {
        for update in StatusTransitionEngine::sweep_plan(at(10, 0)) {
            store.apply_bulk(&update);
        }
    });

    assert_validation(
        s.scheduling.set_status("m", &alice(), MeetingStatus::Cancelled).await,
        "Meeting m changed status concurrently; reload and retry",
    );
    assert_eq!(s.repo.inner.get("m").unwrap().status, MeetingStatus::Ongoing);
}

#[tokio::test]
async fn storage_exclusion_on_create_reads_as_the_conflict_message() {
    let s = Scripted::new(Vec::new(), 8);
    s.repo.reject_writes_with_conflict();

    assert_validation(
        s.scheduling.create(ALICE, NewMeeting::new("Office hours", at(10, 0), at(11, 0))).await,
        "You have another meeting scheduled during this time",
    );
    assert!(s.repo.inner.all().is_empty());
}

#[tokio::test]
async fn storage_exclusion_on_reschedule_reads_as_the_conflict_message() {
    let s = Scripted::new(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Scheduled)],
        8,
    );
    s.repo.reject_writes_with_conflict();

    let patch = MeetingPatch {
        start_time: Some(at(12, 0)),
        end_time: Some(at(13, 0)),
        ..Default::default()
    };
    assert_validation(
        s.scheduling.update("m", &alice(), patch).await,
        "This time conflicts with another scheduled meeting",
    );
}

#[tokio::test]
async fn lost_status_race_in_storage_reads_as_validation() {
    let s = Scripted::new(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Scheduled)],
        8,
    );
    s.repo.reject_writes_with_conflict();

    assert_validation(
        s.scheduling.set_status("m", &alice(), MeetingStatus::Cancelled).await,
        "Meeting m changed status concurrently; reload and retry",
    );
    assert_eq!(s.repo.inner.get("m").unwrap().status, MeetingStatus::Scheduled);
}

#[tokio::test]
async fn denying_authorizer_blocks_every_mutation() {
    let s = Scripted::with_authorizer(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Scheduled)],
        8,
        Arc::new(FixedAuthorizer(false)),
    );
    let patch = MeetingPatch { title: Some("Renamed".into()), ..Default::default() };

    for actor in [alice(), admin()] {
        let results = [
            s.scheduling.update("m", &actor, patch.clone()).await.err(),
            s.scheduling.set_status("m", &actor, MeetingStatus::Cancelled).await.err(),
            s.scheduling.delete("m", &actor).await.err(),
        ];
        for result in results {
            assert!(matches!(result, Some(MeetSchedError::Forbidden(_))), "got {result:?}");
        }
    }
    assert_eq!(s.repo.inner.writes(), 0);
}

#[tokio::test]
async fn permissive_authorizer_lets_any_actor_mutate() {
    let s = Scripted::with_authorizer(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Scheduled)],
        8,
        Arc::new(FixedAuthorizer(true)),
    );
    let stranger = Actor::new("student-eve", ActorRole::Student);

    let cancelled =
        s.scheduling.set_status("m", &stranger, MeetingStatus::Cancelled).await.unwrap();
    assert_eq!(cancelled.status, MeetingStatus::Cancelled);
}

#[tokio::test]
async fn page_far_past_the_end_is_rejected_instead_of_overflowing() {
    let s = Scripted::new(
        vec![stored("m", ALICE, at(10, 0), at(11, 0), MeetingStatus::Scheduled)],
        8,
    );

    let result =
        s.scheduling.list(MeetingQuery::new(), PageRequest { page: usize::MAX, limit: 10 }).await;
    assert!(matches!(result, Err(MeetSchedError::Validation(_))), "got {result:?}");

    let beyond = s
        .scheduling
        .list(MeetingQuery::new(), PageRequest { page: 1_000, limit: 10 })
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 1);
}
