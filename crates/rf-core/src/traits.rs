//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the services.
//! Every read hides soft-deleted rows unless stated otherwise.

use async_trait::async_trait;

use crate::models::{
    CascadeReport, Comment, Discussion, DiscussionSummary, ElementId, ElementLookup, ElementRef, NewComment,
    NewDiscussion, PurgeReport, Role, User, UserId, VoteKind,
};

/// Data persistence contract for discussions and comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    // Discussion Operations

    /// Stamps the creation time, starts with empty vote sets and `deleted = false`.
    async fn create_discussion(&self, discussion: NewDiscussion) -> anyhow::Result<ElementId>;
    async fn get_discussion(&self, id: ElementId) -> anyhow::Result<Option<Discussion>>;
    async fn list_discussions(&self) -> anyhow::Result<Vec<DiscussionSummary>>;
    /// Relevance-ranked text match over title and content.
    async fn search_discussions(&self, term: &str) -> anyhow::Result<Vec<Discussion>>;
    /// Sets content and the edited flag. Returns `false` if the discussion is not live.
    async fn update_discussion(&self, id: ElementId, content: &str) -> anyhow::Result<bool>;
    /// Soft-deletes the discussion and every comment under it in one unit.
    /// Re-running it on a deleted discussion finishes any partial cascade.
    async fn soft_delete_discussion(&self, id: ElementId) -> anyhow::Result<CascadeReport>;

    // Comment Operations

    async fn get_comment(&self, id: ElementId) -> anyhow::Result<Option<Comment>>;
    /// All comments of a discussion in storage order, deleted ones included.
    async fn list_comments(&self, discussion_id: ElementId) -> anyhow::Result<Vec<Comment>>;
    /// Inserts only while the discussion (and `related_to`, if any) is still
    /// live and consistent; returns `None` otherwise.
    async fn create_comment(&self, comment: NewComment) -> anyhow::Result<Option<ElementId>>;
    async fn update_comment(&self, id: ElementId, content: &str) -> anyhow::Result<bool>;
    /// Marks a single comment deleted; children are left untouched.
    async fn soft_delete_comment(&self, id: ElementId) -> anyhow::Result<bool>;

    // Moderation

    /// Soft-deletes everything authored by `user_id`, cascading each of their
    /// discussions to its comments.
    async fn purge_user(&self, user_id: UserId) -> anyhow::Result<PurgeReport>;
}

/// Like/dislike membership contract, shared by discussions and comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Checks both collections for a live element with this id.
    async fn resolve_element(&self, id: ElementId) -> anyhow::Result<ElementLookup>;
    /// Removes `user_id` from both sets of the element.
    async fn remove_vote(&self, target: ElementRef, user_id: UserId) -> anyhow::Result<()>;
    /// Replaces whatever vote `user_id` held on the element with `kind`, atomically.
    async fn add_vote(
        &self,
        target: ElementRef,
        user_id: UserId,
        kind: VoteKind,
    ) -> anyhow::Result<()>;
}

/// Read/ban contract onto the relational user domain.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: UserId) -> anyhow::Result<Option<User>>;
    async fn create_user(&self, username: &str, role: Role) -> anyhow::Result<UserId>;
    /// Returns `false` when no such user exists.
    async fn set_banned(&self, id: UserId, banned: bool) -> anyhow::Result<bool>;
}
