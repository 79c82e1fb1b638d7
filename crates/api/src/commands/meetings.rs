//! Meeting CRUD commands

use chrono::{DateTime, Utc};
use meetsched_domain::types::{
    Actor, Meeting, MeetingPage, MeetingPatch, MeetingQuery, MeetingSort, MeetingStatus,
    NewMeeting, PageRequest, SortField, SortOrder,
};
use meetsched_domain::Result;
use serde::{Deserialize, Serialize};

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

/// Filters, sort and pagination for [`list_meetings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeetingsRequest {
    #[serde(default)]
    pub status: Option<MeetingStatus>,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListMeetingsRequest {
    fn into_parts(self) -> (MeetingQuery, PageRequest) {
        let defaults = PageRequest::default();
        let page = PageRequest {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        };

        let query = MeetingQuery {
            creator_id: self.creator_id,
            statuses: self.status.into_iter().collect(),
            starts_from: self.start_date,
            starts_until: self.end_date,
            search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            sort: MeetingSort::new(self.sort_by, self.sort_order),
            ..MeetingQuery::default()
        };

        (query, page)
    }
}

pub async fn create_meeting(
    ctx: &AppContext,
    creator_id: &str,
    input: NewMeeting,
) -> Result<Meeting> {
    execute_command("meetings::create_meeting", || ctx.scheduling.create(creator_id, input)).await
}

pub async fn update_meeting(
    ctx: &AppContext,
    id: &str,
    actor: &Actor,
    patch: MeetingPatch,
) -> Result<Meeting> {
    execute_command("meetings::update_meeting", || ctx.scheduling.update(id, actor, patch)).await
}

/// Explicit status change. Only cancellation is accepted; time-driven
/// transitions belong to the sweep.
pub async fn update_meeting_status(
    ctx: &AppContext,
    id: &str,
    actor: &Actor,
    status: MeetingStatus,
) -> Result<Meeting> {
    execute_command("meetings::update_meeting_status", || {
        ctx.scheduling.set_status(id, actor, status)
    })
    .await
}

pub async fn delete_meeting(ctx: &AppContext, id: &str, actor: &Actor) -> Result<()> {
    execute_command("meetings::delete_meeting", || ctx.scheduling.delete(id, actor)).await
}

pub async fn get_meeting(ctx: &AppContext, id: &str) -> Result<Meeting> {
    execute_command("meetings::get_meeting", || ctx.scheduling.get_by_id(id)).await
}

pub async fn list_meetings(ctx: &AppContext, request: ListMeetingsRequest) -> Result<MeetingPage> {
    let (query, page) = request.into_parts();
    execute_command("meetings::list_meetings", || ctx.scheduling.list(query, page)).await
}
