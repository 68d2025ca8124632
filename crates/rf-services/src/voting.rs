//! Vote routing: one entry point for discussions and comments.

use rf_core::{Actor, ElementId, ElementRef, ForumError, Result};
use tracing::{info, instrument};

use crate::{ensure_active, ForumService};

impl ForumService {
    /// Resolves `element_id` against both collections and records the vote on
    /// the one live element it names. A repeated vote is a no-op; a switched
    /// vote replaces the previous one.
    #[instrument(skip(self), fields(actor_id = actor.user_id))]
    pub async fn vote(&self, actor: &Actor, element_id: &str, vote: &str) -> Result<ElementRef> {
        ensure_active(self.users.as_ref(), actor).await?;
        let kind = self.validator.parse_vote(vote)?;
        let target = self.resolve_target(element_id).await?;

        self.votes
            .add_vote(target, actor.user_id, kind)
            .await
            .map_err(ForumError::storage("add_vote", target.id))?;

        info!(element_id = %target.id, element_kind = %target.kind, vote = kind.as_str(), "vote recorded");
        Ok(target)
    }

    /// Withdraws whatever vote the actor holds on the element.
    #[instrument(skip(self), fields(actor_id = actor.user_id))]
    pub async fn retract_vote(&self, actor: &Actor, element_id: &str) -> Result<ElementRef> {
        ensure_active(self.users.as_ref(), actor).await?;
        let target = self.resolve_target(element_id).await?;

        self.votes
            .remove_vote(target, actor.user_id)
            .await
            .map_err(ForumError::storage("remove_vote", target.id))?;

        info!(element_id = %target.id, element_kind = %target.kind, "vote retracted");
        Ok(target)
    }

    async fn resolve_target(&self, raw: &str) -> Result<ElementRef> {
        let unresolved = || ForumError::AmbiguousOrNotFound(raw.to_string());
        let id = ElementId::parse(raw).ok_or_else(unresolved)?;
        self.votes
            .resolve_element(id)
            .await
            .map_err(ForumError::storage("resolve_element", id))?
            .target()
            .ok_or_else(unresolved)
    }
}
