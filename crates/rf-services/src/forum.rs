//! Discussion and comment lifecycle: create, read, search, edit.

use std::sync::Arc;

use rf_core::{
    build_tree, Actor, Comment, ContentStore, ContentValidator, Discussion, DiscussionSummary,
    ElementId, ForumError, NewComment, NewDiscussion, Result, ThreadedComment, UserDirectory,
    VoteLedger,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{comment_by_id, discussion_by_id, ensure_active, load_comment, load_discussion};

/// A live discussion with its comment forest.
#[derive(Debug, Clone, Serialize)]
pub struct DiscussionThread {
    pub discussion: Discussion,
    pub comments: Vec<ThreadedComment>,
}

pub struct ForumService {
    pub(crate) content: Arc<dyn ContentStore>,
    pub(crate) votes: Arc<dyn VoteLedger>,
    pub(crate) users: Arc<dyn UserDirectory>,
    pub(crate) validator: ContentValidator,
}

impl ForumService {
    pub fn new(
        content: Arc<dyn ContentStore>,
        votes: Arc<dyn VoteLedger>,
        users: Arc<dyn UserDirectory>,
        validator: ContentValidator,
    ) -> Self {
        Self { content, votes, users, validator }
    }

    #[instrument(skip(self, title, content), fields(actor_id = actor.user_id))]
    pub async fn create_discussion(&self, actor: &Actor, title: &str, content: &str) -> Result<ElementId> {
        ensure_active(self.users.as_ref(), actor).await?;
        self.validator.validate_title(title)?;
        self.validator.validate_content(content)?;

        let id = self
            .content
            .create_discussion(NewDiscussion {
                title: title.to_string(),
                content: content.to_string(),
                author_id: actor.user_id,
            })
            .await
            .map_err(ForumError::storage("create_discussion", format!("author {}", actor.user_id)))?;

        info!(discussion_id = %id, author_id = actor.user_id, "discussion created");
        Ok(id)
    }

    /// `related_to` may be absent or empty for a root comment.
    #[instrument(skip(self, content), fields(actor_id = actor.user_id))]
    pub async fn create_comment(
        &self,
        actor: &Actor,
        discussion_id: &str,
        related_to: Option<&str>,
        content: &str,
    ) -> Result<ElementId> {
        ensure_active(self.users.as_ref(), actor).await?;
        self.validator.validate_content(content)?;

        let discussion_id = ElementId::parse(discussion_id).ok_or_else(|| {
            ForumError::InvalidReference(format!("malformed discussion id '{discussion_id}'"))
        })?;
        discussion_by_id(self.content.as_ref(), discussion_id).await?;

        let related_to = match related_to.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(self.check_parent(discussion_id, raw).await?),
            None => None,
        };

        let id = self
            .content
            .create_comment(NewComment {
                discussion_id,
                related_to,
                content: content.to_string(),
                author_id: actor.user_id,
            })
            .await
            .map_err(ForumError::storage("create_comment", discussion_id))?
            .ok_or_else(|| {
                ForumError::InvalidReference(format!(
                    "discussion {discussion_id} or its parent comment was deleted meanwhile"
                ))
            })?;

        info!(comment_id = %id, discussion_id = %discussion_id, author_id = actor.user_id, "comment created");
        Ok(id)
    }

    pub async fn get_discussion(&self, id: &str) -> Result<Discussion> {
        load_discussion(self.content.as_ref(), id).await
    }

    pub async fn get_comment(&self, id: &str) -> Result<Comment> {
        load_comment(self.content.as_ref(), id).await
    }

    /// The discussion plus its threaded comments; deleted comments keep their
    /// place in the thread with placeholder content.
    pub async fn get_discussion_with_comments(&self, id: &str) -> Result<DiscussionThread> {
        let discussion = self.get_discussion(id).await?;
        let comments = self
            .content
            .list_comments(discussion.id)
            .await
            .map_err(ForumError::storage("list_comments", discussion.id))?;

        Ok(DiscussionThread { comments: build_tree(comments), discussion })
    }

    pub async fn list_discussions(&self) -> Result<Vec<DiscussionSummary>> {
        self.content
            .list_discussions()
            .await
            .map_err(ForumError::storage("list_discussions", "all"))
    }

    pub async fn search_discussions(&self, term: &str) -> Result<Vec<Discussion>> {
        self.validator.validate_search_term(term)?;
        let mut found = self
            .content
            .search_discussions(term.trim())
            .await
            .map_err(ForumError::storage("search_discussions", term))?;
        // Deleted discussions never leave the service, whatever the index returned.
        found.retain(|discussion| !discussion.deleted);
        Ok(found)
    }

    #[instrument(skip(self, content), fields(actor_id = actor.user_id))]
    pub async fn update_discussion(&self, actor: &Actor, id: &str, content: &str) -> Result<Discussion> {
        ensure_active(self.users.as_ref(), actor).await?;
        self.validator.validate_content(content)?;
        let current = self.get_discussion(id).await?;
        if current.author_id != actor.user_id {
            warn!(discussion_id = %current.id, actor_id = actor.user_id, "edit refused: not the author");
            return Err(ForumError::Forbidden(format!(
                "user {} is not the author of discussion {}",
                actor.user_id, current.id
            )));
        }

        let updated = self
            .content
            .update_discussion(current.id, content)
            .await
            .map_err(ForumError::storage("update_discussion", current.id))?;
        if !updated {
            return Err(ForumError::not_found("discussion", current.id));
        }

        info!(discussion_id = %current.id, "discussion edited");
        discussion_by_id(self.content.as_ref(), current.id).await
    }

    #[instrument(skip(self, content), fields(actor_id = actor.user_id))]
    pub async fn update_comment(&self, actor: &Actor, id: &str, content: &str) -> Result<Comment> {
        ensure_active(self.users.as_ref(), actor).await?;
        self.validator.validate_content(content)?;
        let current = self.get_comment(id).await?;
        if current.author_id != actor.user_id {
            warn!(comment_id = %current.id, actor_id = actor.user_id, "edit refused: not the author");
            return Err(ForumError::Forbidden(format!(
                "user {} is not the author of comment {}",
                actor.user_id, current.id
            )));
        }

        let updated = self
            .content
            .update_comment(current.id, content)
            .await
            .map_err(ForumError::storage("update_comment", current.id))?;
        if !updated {
            return Err(ForumError::not_found("comment", current.id));
        }

        info!(comment_id = %current.id, "comment edited");
        comment_by_id(self.content.as_ref(), current.id).await
    }

    async fn check_parent(&self, discussion_id: ElementId, raw: &str) -> Result<ElementId> {
        let parent_id = ElementId::parse(raw)
            .ok_or_else(|| ForumError::InvalidReference(format!("malformed parent comment id '{raw}'")))?;
        let parent = self
            .content
            .get_comment(parent_id)
            .await
            .map_err(ForumError::storage("get_comment", parent_id))?
            .ok_or_else(|| {
                ForumError::InvalidReference(format!("parent comment {parent_id} does not exist"))
            })?;
        if parent.discussion_id != discussion_id {
            return Err(ForumError::InvalidReference(format!(
                "parent comment {parent_id} belongs to discussion {}, not {discussion_id}",
                parent.discussion_id
            )));
        }
        Ok(parent_id)
    }
}
