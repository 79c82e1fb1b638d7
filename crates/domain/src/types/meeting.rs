//! Meeting entity and status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Lifecycle status of a meeting.
///
/// `Scheduled` is the initial state; `Completed` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl_domain_status_conversions!(MeetingStatus {
    Scheduled => "SCHEDULED",
    Ongoing => "ONGOING",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

impl MeetingStatus {
    /// Every status, in state machine order.
    pub const ALL: [MeetingStatus; 4] =
        [Self::Scheduled, Self::Ongoing, Self::Completed, Self::Cancelled];

    /// Statuses that still take part in conflict detection.
    pub const ACTIVE: [MeetingStatus; 3] = [Self::Scheduled, Self::Ongoing, Self::Completed];

    /// Statuses the sweep may still advance.
    pub const OPEN: [MeetingStatus; 2] = [Self::Scheduled, Self::Ongoing];

    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `self -> target` is an edge of the transition table.
    ///
    /// | From      | To        |
    /// |-----------|-----------|
    /// | Scheduled | Ongoing, Completed, Cancelled |
    /// | Ongoing   | Completed, Cancelled |
    /// | Completed | none |
    /// | Cancelled | none |
    pub fn can_transition_to(self, target: MeetingStatus) -> bool {
        matches!(
            (self, target),
            (Self::Scheduled, Self::Ongoing)
                | (Self::Scheduled, Self::Completed)
                | (Self::Scheduled, Self::Cancelled)
                | (Self::Ongoing, Self::Completed)
                | (Self::Ongoing, Self::Cancelled)
        )
    }

    /// Whether a user may request `self -> target` explicitly.
    ///
    /// Only cancellation is a manual transition; the others are driven by
    /// the clock.
    pub fn allows_manual_transition_to(self, target: MeetingStatus) -> bool {
        target == Self::Cancelled && self.can_transition_to(target)
    }
}

/// A scheduled meeting owned by a single creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: MeetingStatus,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    /// Active meetings (anything but `Cancelled`) block overlapping slots.
    pub fn is_active(&self) -> bool {
        self.status != MeetingStatus::Cancelled
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Whether `now` falls inside `[start_time, end_time)`.
    pub fn is_in_progress_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Whether the meeting has ended by `now`.
    pub fn has_ended_by(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }
}

/// Input for creating a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meeting_url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl NewMeeting {
    pub fn new(title: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self { title: title.into(), description: None, meeting_url: None, start_time, end_time }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_meeting_url(mut self, url: impl Into<String>) -> Self {
        self.meeting_url = Some(url.into());
        self
    }
}

/// Fully validated meeting ready to be persisted. The repository assigns the
/// id and audit timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDraft {
    pub title: String,
    pub description: Option<String>,
    pub meeting_url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: MeetingStatus,
    pub creator_id: String,
}

/// Partial update of a meeting. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl MeetingPatch {
    /// True when either time field is being changed.
    pub fn touches_schedule(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.meeting_url.is_none()
            && !self.touches_schedule()
    }
}

/// Role of the acting user, resolved by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Admin,
    Instructor,
    Student,
}

impl_domain_status_conversions!(ActorRole {
    Admin => "ADMIN",
    Instructor => "INSTRUCTOR",
    Student => "STUDENT",
});

impl ActorRole {
    pub fn is_elevated(self) -> bool {
        self == Self::Admin
    }
}

/// The user performing a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self { id: id.into(), role }
    }
}

/// Calendar projection of a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: MeetingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Meeting> for CalendarEvent {
    fn from(meeting: Meeting) -> Self {
        Self {
            id: meeting.id,
            title: meeting.title,
            start: meeting.start_time,
            end: meeting.end_time,
            status: meeting.status,
            meeting_url: meeting.meeting_url,
            description: meeting.description,
        }
    }
}
