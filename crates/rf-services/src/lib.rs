//! # rf-services
//!
//! Orchestration for the forum: every mutating operation takes an explicit
//! [`Actor`], loads the target fresh from the store, applies its
//! authorization rule, then delegates to the ports in `rf-core`.

mod forum;
mod moderation;
mod voting;

pub use forum::{DiscussionThread, ForumService};
pub use moderation::{BanOutcome, ModerationService};

use rf_core::{Actor, Comment, ContentStore, Discussion, ElementId, ForumError, Result, UserDirectory};
use tracing::warn;

/// Refuses banned or unknown accounts. The ban flag is read from the user
/// directory on every call; reads never go through this gate.
pub(crate) async fn ensure_active(users: &dyn UserDirectory, actor: &Actor) -> Result<()> {
    let user = users
        .get_user(actor.user_id)
        .await
        .map_err(ForumError::storage("get_user", format!("user {}", actor.user_id)))?;

    match user {
        Some(user) if !user.banned => Ok(()),
        Some(_) => {
            warn!(actor_id = actor.user_id, "mutation refused: user is banned");
            Err(ForumError::Forbidden(format!("user {} is banned", actor.user_id)))
        }
        None => Err(ForumError::Forbidden(format!("user {} is not registered", actor.user_id))),
    }
}

pub(crate) async fn discussion_by_id(content: &dyn ContentStore, id: ElementId) -> Result<Discussion> {
    content
        .get_discussion(id)
        .await
        .map_err(ForumError::storage("get_discussion", id))?
        .ok_or_else(|| ForumError::not_found("discussion", id))
}

pub(crate) async fn comment_by_id(content: &dyn ContentStore, id: ElementId) -> Result<Comment> {
    content
        .get_comment(id)
        .await
        .map_err(ForumError::storage("get_comment", id))?
        .ok_or_else(|| ForumError::not_found("comment", id))
}

/// A raw id that does not parse is as absent as a deleted one.
pub(crate) async fn load_discussion(content: &dyn ContentStore, raw: &str) -> Result<Discussion> {
    let id = ElementId::parse(raw).ok_or_else(|| ForumError::not_found("discussion", raw))?;
    discussion_by_id(content, id).await
}

pub(crate) async fn load_comment(content: &dyn ContentStore, raw: &str) -> Result<Comment> {
    let id = ElementId::parse(raw).ok_or_else(|| ForumError::not_found("comment", raw))?;
    comment_by_id(content, id).await
}
