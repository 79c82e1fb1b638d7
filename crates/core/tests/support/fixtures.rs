//! Time and meeting fixtures.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use meetsched_core::{
    CalendarQueryService, CreatorOrAdmin, MockClock, SchedulingService, StatusTransitionEngine,
};
use meetsched_domain::{Actor, ActorRole, Meeting, MeetingStatus};

use super::repositories::InMemoryMeetingRepository;

pub const ALICE: &str = "instructor-alice";
pub const BOB: &str = "instructor-bob";

/// 2025-03-10 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

pub fn alice() -> Actor {
    Actor::new(ALICE, ActorRole::Instructor)
}

pub fn bob() -> Actor {
    Actor::new(BOB, ActorRole::Instructor)
}

pub fn admin() -> Actor {
    Actor::new("admin-root", ActorRole::Admin)
}

/// Stored meeting built directly, for seeding a repository.
pub fn stored(
    id: &str,
    creator_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: MeetingStatus,
) -> Meeting {
    Meeting {
        id: id.to_string(),
        title: format!("Meeting {id}"),
        description: None,
        meeting_url: None,
        start_time: start,
        end_time: end,
        status,
        creator_id: creator_id.to_string(),
        created_at: start - Duration::days(1),
        updated_at: start - Duration::days(1),
    }
}

/// Repository, clock and all three services wired over the same store.
pub struct Harness {
    pub repo: InMemoryMeetingRepository,
    pub clock: Arc<MockClock>,
    pub scheduling: SchedulingService,
    pub calendar: CalendarQueryService,
    pub status: StatusTransitionEngine,
}

impl Harness {
    /// Clock starts at 08:00 UTC on the fixture day.
    pub fn new() -> Self {
        Self::with_timezone(chrono_tz::UTC)
    }

    pub fn with_timezone(timezone: chrono_tz::Tz) -> Self {
        Self::build(InMemoryMeetingRepository::new(), at(8, 0), timezone)
    }

    pub fn seeded(meetings: Vec<Meeting>, now: DateTime<Utc>) -> Self {
        Self::build(InMemoryMeetingRepository::seeded(meetings), now, chrono_tz::UTC)
    }

    pub fn build(
        repo: InMemoryMeetingRepository,
        now: DateTime<Utc>,
        timezone: chrono_tz::Tz,
    ) -> Self {
        let clock = Arc::new(MockClock::new(now));
        let shared = Arc::new(repo.clone());

        Self {
            scheduling: SchedulingService::new(
                shared.clone(),
                Arc::new(CreatorOrAdmin),
                clock.clone(),
            ),
            calendar: CalendarQueryService::new(shared.clone(), clock.clone(), timezone),
            status: StatusTransitionEngine::new(shared, clock.clone()),
            repo,
            clock,
        }
    }
}
