//! Owner and moderator deletes, plus the ban-triggered history purge.

use std::sync::Arc;

use rf_core::{
    Actor, BanAction, CascadeReport, ContentStore, ForumError, PurgeReport, Result, User, UserDirectory,
    UserId,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{ensure_active, load_comment, load_discussion};

/// Result of a ban or unban: the account as stored afterwards and, for a ban,
/// what the purge soft-deleted.
#[derive(Debug, Clone, Serialize)]
pub struct BanOutcome {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge: Option<PurgeReport>,
}

pub struct ModerationService {
    content: Arc<dyn ContentStore>,
    users: Arc<dyn UserDirectory>,
}

impl ModerationService {
    pub fn new(content: Arc<dyn ContentStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { content, users }
    }

    /// Only the author may delete a discussion; there is no moderator override here.
    #[instrument(skip(self), fields(actor_id = actor.user_id))]
    pub async fn delete_discussion(&self, actor: &Actor, id: &str) -> Result<CascadeReport> {
        ensure_active(self.users.as_ref(), actor).await?;
        let discussion = load_discussion(self.content.as_ref(), id).await?;
        let id = discussion.id;

        if discussion.author_id != actor.user_id {
            warn!(discussion_id = %id, actor_id = actor.user_id, "delete refused: not the author");
            return Err(ForumError::Forbidden(format!(
                "user {} is not the author of discussion {id}",
                actor.user_id
            )));
        }

        let report = self
            .content
            .soft_delete_discussion(id)
            .await
            .map_err(ForumError::storage("soft_delete_discussion", id))?;
        if !report.discussion_deleted {
            return Err(ForumError::not_found("discussion", id));
        }

        info!(discussion_id = %id, comments = report.comments, "discussion deleted with its comments");
        Ok(report)
    }

    /// Deletes one comment. Moderators bypass the ownership check; replies
    /// under the comment stay live.
    #[instrument(skip(self), fields(actor_id = actor.user_id, role = actor.role.as_str()))]
    pub async fn delete_comment(&self, actor: &Actor, id: &str) -> Result<()> {
        ensure_active(self.users.as_ref(), actor).await?;
        let comment = load_comment(self.content.as_ref(), id).await?;

        if !actor.is_moderator() && comment.author_id != actor.user_id {
            warn!(comment_id = %comment.id, actor_id = actor.user_id, "delete refused: not the author");
            return Err(ForumError::Forbidden(format!(
                "user {} may not delete comment {}",
                actor.user_id, comment.id
            )));
        }

        let deleted = self
            .content
            .soft_delete_comment(comment.id)
            .await
            .map_err(ForumError::storage("soft_delete_comment", comment.id))?;
        if !deleted {
            return Err(ForumError::not_found("comment", comment.id));
        }

        info!(comment_id = %comment.id, moderated = comment.author_id != actor.user_id, "comment deleted");
        Ok(())
    }

    /// Soft-deletes everything `user_id` authored. Safe to re-run: a second
    /// call finds nothing live and reports zero.
    #[instrument(skip(self))]
    pub async fn purge_full_history(&self, user_id: UserId) -> Result<PurgeReport> {
        let report = self
            .content
            .purge_user(user_id)
            .await
            .map_err(ForumError::storage("purge_user", format!("user {user_id}")))?;

        info!(user_id, discussions = report.discussions, comments = report.comments, "history purged");
        Ok(report)
    }

    /// Flips the ban flag. A ban purges the user's history once the flag is
    /// stored; an unban restores nothing.
    #[instrument(skip(self), fields(actor_id = actor.user_id))]
    pub async fn set_ban_status(&self, actor: &Actor, user_id: UserId, action: BanAction) -> Result<BanOutcome> {
        ensure_active(self.users.as_ref(), actor).await?;
        if !actor.is_moderator() {
            warn!(actor_id = actor.user_id, target = user_id, "ban refused: not a moderator");
            return Err(ForumError::Forbidden(format!(
                "user {} may not change ban status",
                actor.user_id
            )));
        }

        let banned = action == BanAction::Ban;
        let updated = self
            .users
            .set_banned(user_id, banned)
            .await
            .map_err(ForumError::storage("set_banned", format!("user {user_id}")))?;
        if !updated {
            return Err(ForumError::not_found("user", user_id));
        }

        let purge = match action {
            BanAction::Ban => Some(self.purge_full_history(user_id).await?),
            BanAction::Unban => None,
        };
        let user = self
            .users
            .get_user(user_id)
            .await
            .map_err(ForumError::storage("get_user", format!("user {user_id}")))?
            .ok_or_else(|| ForumError::not_found("user", user_id))?;

        info!(user_id, banned, "ban status changed");
        Ok(BanOutcome { user, purge })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;
    use mockall::Sequence;
    use rf_core::{ElementId, ErrorKind, MockContentStore, MockUserDirectory};

    use super::*;
    use crate::fixtures::{account, active_users, comment, discussion};

    fn service(content: MockContentStore, users: MockUserDirectory) -> ModerationService {
        ModerationService::new(Arc::new(content), Arc::new(users))
    }

    /// Every account is active except `banned`, whose stored flag reads as set.
    fn directory_with_banned(banned: UserId) -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users.expect_get_user().returning(move |id| Ok(Some(account(id, id == banned))));
        users
    }

    #[tokio::test]
    async fn owner_delete_cascades() {
        let id = ElementId::generate();
        let mut content = MockContentStore::new();
        content
            .expect_get_discussion()
            .return_once(move |_| Ok(Some(discussion(id, 7))));
        content
            .expect_soft_delete_discussion()
            .with(eq(id))
            .times(1)
            .return_once(|_| Ok(CascadeReport { discussion_deleted: true, comments: 3 }));

        let report = service(content, active_users())
            .delete_discussion(&Actor::customer(7), &id.to_string())
            .await
            .unwrap();
        assert_eq!(report.comments, 3);
    }

    #[tokio::test]
    async fn admin_cannot_delete_someone_elses_discussion() {
        let id = ElementId::generate();
        let mut content = MockContentStore::new();
        content
            .expect_get_discussion()
            .return_once(move |_| Ok(Some(discussion(id, 7))));
        content.expect_soft_delete_discussion().never();

        let err = service(content, active_users())
            .delete_discussion(&Actor::admin(1), &id.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn discussion_deleted_meanwhile_is_not_found() {
        let id = ElementId::generate();
        let mut content = MockContentStore::new();
        content
            .expect_get_discussion()
            .return_once(move |_| Ok(Some(discussion(id, 7))));
        content
            .expect_soft_delete_discussion()
            .with(eq(id))
            .times(1)
            .return_once(|_| Ok(CascadeReport { discussion_deleted: false, comments: 0 }));

        let err = service(content, active_users())
            .delete_discussion(&Actor::customer(7), &id.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn banned_owner_cannot_delete_own_discussion() {
        let mut content = MockContentStore::new();
        content.expect_get_discussion().never();
        content.expect_soft_delete_discussion().never();

        let err = service(content, directory_with_banned(7))
            .delete_discussion(&Actor::customer(7), &ElementId::generate().to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn moderator_bypasses_comment_ownership() {
        let id = ElementId::generate();
        let parent = ElementId::generate();
        let mut content = MockContentStore::new();
        content
            .expect_get_comment()
            .return_once(move |_| Ok(Some(comment(id, parent, 7))));
        content
            .expect_soft_delete_comment()
            .with(eq(id))
            .times(1)
            .return_once(|_| Ok(true));

        service(content, active_users())
            .delete_comment(&Actor::admin(1), &id.to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn customer_cannot_delete_someone_elses_comment() {
        let id = ElementId::generate();
        let parent = ElementId::generate();
        let mut content = MockContentStore::new();
        content
            .expect_get_comment()
            .return_once(move |_| Ok(Some(comment(id, parent, 7))));
        content.expect_soft_delete_comment().never();

        let err = service(content, active_users())
            .delete_comment(&Actor::customer(8), &id.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn comment_delete_reads_like_a_comment_lookup() {
        let mut content = MockContentStore::new();
        content.expect_get_comment().never();
        content.expect_soft_delete_comment().never();
        let moderation = service(content, active_users());

        let err = moderation.delete_comment(&Actor::admin(1), "nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), ForumError::not_found("comment", "nope").to_string());
    }

    #[tokio::test]
    async fn ban_stores_flag_before_purging() {
        let mut seq = Sequence::new();
        let mut content = MockContentStore::new();
        let mut users = directory_with_banned(4);
        users
            .expect_set_banned()
            .with(eq(4), eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_, _| Ok(true));
        content
            .expect_purge_user()
            .with(eq(4))
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_| Ok(PurgeReport { discussions: 1, comments: 2 }));

        let outcome = service(content, users)
            .set_ban_status(&Actor::admin(1), 4, BanAction::Ban)
            .await
            .unwrap();
        assert!(outcome.user.banned);
        assert_eq!(outcome.purge, Some(PurgeReport { discussions: 1, comments: 2 }));
    }

    #[tokio::test]
    async fn unban_does_not_touch_content() {
        let mut content = MockContentStore::new();
        content.expect_purge_user().never();
        let mut users = active_users();
        users.expect_set_banned().with(eq(4), eq(false)).return_once(|_, _| Ok(true));

        let outcome = service(content, users)
            .set_ban_status(&Actor::admin(1), 4, BanAction::Unban)
            .await
            .unwrap();
        assert!(outcome.purge.is_none());
    }

    #[tokio::test]
    async fn ban_requires_moderator() {
        let mut users = active_users();
        users.expect_set_banned().never();

        let err = service(MockContentStore::new(), users)
            .set_ban_status(&Actor::customer(2), 4, BanAction::Ban)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn ban_of_unknown_user_is_not_found() {
        let mut content = MockContentStore::new();
        content.expect_purge_user().never();
        let mut users = active_users();
        users.expect_set_banned().return_once(|_, _| Ok(false));

        let err = service(content, users)
            .set_ban_status(&Actor::admin(1), 404, BanAction::Ban)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn purge_failure_surfaces_as_storage_error() {
        let mut content = MockContentStore::new();
        content
            .expect_purge_user()
            .return_once(|_| Err(anyhow::anyhow!("disk I/O error")));

        let err = service(content, MockUserDirectory::new())
            .purge_full_history(4)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("user 4"));
    }
}
