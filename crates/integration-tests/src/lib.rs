//! Shared harness: the SQLite store on an in-memory database wired into both
//! services, the same way the binary assembles them.

use std::sync::Arc;

use rf_core::{Actor, ContentValidator, ElementId, Role, User, UserDirectory, ValidationLimits};
use rf_db_sqlite::SqliteForumStore;
use rf_services::{ForumService, ModerationService};

pub struct TestForum {
    pub store: Arc<SqliteForumStore>,
    pub forum: ForumService,
    pub moderation: ModerationService,
}

impl TestForum {
    pub async fn new() -> anyhow::Result<Self> {
        let store = Arc::new(SqliteForumStore::new("sqlite::memory:").await?);
        let validator = ContentValidator::new(ValidationLimits::default())?;
        Ok(Self {
            forum: ForumService::new(store.clone(), store.clone(), store.clone(), validator),
            moderation: ModerationService::new(store.clone(), store.clone()),
            store,
        })
    }

    pub async fn user(&self, username: &str, role: Role) -> anyhow::Result<Actor> {
        let id = self.store.create_user(username, role).await?;
        Ok(Actor::new(id, role))
    }

    /// The stored account behind `actor`.
    pub async fn account(&self, actor: &Actor) -> anyhow::Result<User> {
        self.store
            .get_user(actor.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {} vanished", actor.user_id))
    }

    pub async fn post(&self, actor: &Actor, title: &str) -> anyhow::Result<String> {
        let id = self.forum.create_discussion(actor, title, "opening post").await?;
        Ok(id.to_string())
    }

    pub async fn reply(
        &self,
        actor: &Actor,
        discussion: &str,
        parent: Option<&str>,
        content: &str,
    ) -> anyhow::Result<String> {
        let id: ElementId = self.forum.create_comment(actor, discussion, parent, content).await?;
        Ok(id.to_string())
    }
}
