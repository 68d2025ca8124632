//! `VoteLedger` over the `votes` table.
//!
//! The primary key `(element_id, user_id)` makes the like and dislike sets
//! disjoint by construction; casting a vote is one upsert on that key.

use async_trait::async_trait;
use rf_core::models::{ElementId, ElementLookup, ElementRef, UserId, VoteKind, Votes};
use rf_core::traits::VoteLedger;
use sqlx::Row;

use crate::rows::{group_votes, VoteRow};
use crate::SqliteForumStore;

impl SqliteForumStore {
    pub(crate) async fn votes_of(&self, id: ElementId) -> anyhow::Result<Votes> {
        let rows: Vec<VoteRow> =
            sqlx::query_as("SELECT element_id, user_id, kind FROM votes WHERE element_id = ?")
                .bind(id.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        Ok(group_votes(rows)?.remove(&id).unwrap_or_default())
    }
}

#[async_trait]
impl VoteLedger for SqliteForumStore {
    async fn resolve_element(&self, id: ElementId) -> anyhow::Result<ElementLookup> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM discussions WHERE id = ?1 AND deleted = 0) AS discussion_live,
                    EXISTS (SELECT 1 FROM comments WHERE id = ?1 AND deleted = 0) AS comment_live",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(ElementLookup::from_liveness(
            id,
            row.try_get("discussion_live")?,
            row.try_get("comment_live")?,
        ))
    }

    async fn remove_vote(&self, target: ElementRef, user_id: UserId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM votes WHERE element_id = ? AND user_id = ?")
            .bind(target.id.as_uuid())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_vote(
        &self,
        target: ElementRef,
        user_id: UserId,
        kind: VoteKind,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO votes (element_id, element_kind, user_id, kind) VALUES (?, ?, ?, ?)
             ON CONFLICT (element_id, user_id) DO UPDATE SET kind = excluded.kind",
        )
        .bind(target.id.as_uuid())
        .bind(target.kind.as_str())
        .bind(user_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
