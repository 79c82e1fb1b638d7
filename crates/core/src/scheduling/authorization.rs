//! Default authorization policy

use async_trait::async_trait;
use meetsched_domain::{Actor, Meeting, Result};

use super::ports::Authorizer;

/// Allows the meeting's creator and any elevated (admin) actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatorOrAdmin;

#[async_trait]
impl Authorizer for CreatorOrAdmin {
    async fn can_mutate(&self, actor: &Actor, meeting: &Meeting) -> Result<bool> {
        Ok(actor.id == meeting.creator_id || actor.role.is_elevated())
    }
}
