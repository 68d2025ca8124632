//! `ContentStore` over the `discussions` and `comments` tables.

use async_trait::async_trait;
use chrono::Utc;
use rf_core::models::{
    CascadeReport, Comment, Discussion, DiscussionSummary, ElementId, NewComment, NewDiscussion,
    PurgeReport, UserId,
};
use rf_core::traits::ContentStore;
use tracing::debug;

use crate::rows::{group_votes, CommentRow, DiscussionRow, SummaryRow, VoteRow};
use crate::{fts_query, SqliteForumStore};

const DISCUSSION_COLUMNS: &str =
    "d.id, d.title, d.content, d.author_id, d.created_at, d.edited, d.deleted";

#[async_trait]
impl ContentStore for SqliteForumStore {
    async fn create_discussion(&self, discussion: NewDiscussion) -> anyhow::Result<ElementId> {
        let id = ElementId::generate();
        sqlx::query(
            "INSERT INTO discussions (id, title, content, author_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.as_uuid())
        .bind(discussion.title)
        .bind(discussion.content)
        .bind(discussion.author_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_discussion(&self, id: ElementId) -> anyhow::Result<Option<Discussion>> {
        let row: Option<DiscussionRow> = sqlx::query_as(&format!(
            "SELECT {DISCUSSION_COLUMNS} FROM discussions d WHERE d.id = ? AND d.deleted = 0"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let votes = self.votes_of(id).await?;
                Ok(Some(row.into_discussion(votes)))
            }
            None => Ok(None),
        }
    }

    async fn list_discussions(&self) -> anyhow::Result<Vec<DiscussionSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT d.id, d.title, d.content, d.author_id, d.created_at, d.edited,
                    (SELECT COUNT(*) FROM votes v WHERE v.element_id = d.id AND v.kind = 'like') AS likes,
                    (SELECT COUNT(*) FROM votes v WHERE v.element_id = d.id AND v.kind = 'dislike') AS dislikes,
                    (SELECT COUNT(*) FROM comments c WHERE c.discussion_id = d.id AND c.deleted = 0) AS comment_count
             FROM discussions d
             WHERE d.deleted = 0
             ORDER BY d.seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DiscussionSummary::from).collect())
    }

    /// Ranks by FTS5 `bm25`; deleted discussions are filtered out explicitly.
    async fn search_discussions(&self, term: &str) -> anyhow::Result<Vec<Discussion>> {
        let Some(query) = fts_query(term) else {
            return Ok(Vec::new());
        };

        let rows: Vec<DiscussionRow> = sqlx::query_as(&format!(
            "SELECT {DISCUSSION_COLUMNS}
             FROM discussions_fts
             JOIN discussions d ON d.seq = discussions_fts.rowid
             WHERE discussions_fts MATCH ? AND d.deleted = 0
             ORDER BY bm25(discussions_fts) ASC, d.seq ASC"
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        let mut found = Vec::with_capacity(rows.len());
        for row in rows {
            let votes = self.votes_of(ElementId::from_uuid(row.id)).await?;
            found.push(row.into_discussion(votes));
        }
        debug!(term, hits = found.len(), "discussion search");
        Ok(found)
    }

    async fn update_discussion(&self, id: ElementId, content: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE discussions SET content = ?, edited = 1 WHERE id = ? AND deleted = 0",
        )
        .bind(content)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete_discussion(&self, id: ElementId) -> anyhow::Result<CascadeReport> {
        let mut tx = self.pool.begin().await?;

        let discussion = sqlx::query("UPDATE discussions SET deleted = 1 WHERE id = ? AND deleted = 0")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await?;

        // Always re-applied so a re-run completes an interrupted cascade.
        let comments = sqlx::query(
            "UPDATE comments SET deleted = 1 WHERE discussion_id = ? AND deleted = 0",
        )
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let report = CascadeReport {
            discussion_deleted: discussion.rows_affected() > 0,
            comments: comments.rows_affected(),
        };
        debug!(discussion_id = %id, comments = report.comments, "discussion cascade applied");
        Ok(report)
    }

    async fn get_comment(&self, id: ElementId) -> anyhow::Result<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as(
            "SELECT id, discussion_id, related_to, content, author_id, created_at, edited, deleted
             FROM comments WHERE id = ? AND deleted = 0",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let votes = self.votes_of(id).await?;
                Ok(Some(row.into_comment(votes)))
            }
            None => Ok(None),
        }
    }

    async fn list_comments(&self, discussion_id: ElementId) -> anyhow::Result<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT id, discussion_id, related_to, content, author_id, created_at, edited, deleted
             FROM comments WHERE discussion_id = ? ORDER BY seq ASC",
        )
        .bind(discussion_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let vote_rows: Vec<VoteRow> = sqlx::query_as(
            "SELECT v.element_id, v.user_id, v.kind
             FROM votes v JOIN comments c ON c.id = v.element_id
             WHERE c.discussion_id = ?",
        )
        .bind(discussion_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        let mut votes = group_votes(vote_rows)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tally = votes.remove(&ElementId::from_uuid(row.id)).unwrap_or_default();
                row.into_comment(tally)
            })
            .collect())
    }

    async fn create_comment(&self, comment: NewComment) -> anyhow::Result<Option<ElementId>> {
        let id = ElementId::generate();
        // The liveness and same-discussion checks ride on the insert itself,
        // so a concurrent delete cannot slip in between check and write.
        let result = sqlx::query(
            "INSERT INTO comments (id, discussion_id, related_to, content, author_id, created_at)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6
             WHERE EXISTS (SELECT 1 FROM discussions WHERE id = ?2 AND deleted = 0)
               AND (?3 IS NULL OR EXISTS (
                   SELECT 1 FROM comments WHERE id = ?3 AND discussion_id = ?2 AND deleted = 0))",
        )
        .bind(id.as_uuid())
        .bind(comment.discussion_id.as_uuid())
        .bind(comment.related_to.map(|parent| parent.as_uuid()))
        .bind(comment.content)
        .bind(comment.author_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok((result.rows_affected() > 0).then_some(id))
    }

    async fn update_comment(&self, id: ElementId, content: &str) -> anyhow::Result<bool> {
        let result =
            sqlx::query("UPDATE comments SET content = ?, edited = 1 WHERE id = ? AND deleted = 0")
                .bind(content)
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete_comment(&self, id: ElementId) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE comments SET deleted = 1 WHERE id = ? AND deleted = 0")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_user(&self, user_id: UserId) -> anyhow::Result<PurgeReport> {
        let mut tx = self.pool.begin().await?;

        // Comments written by the user, plus every comment under any of their
        // discussions (deleted or not, so an interrupted cascade is finished).
        let comments = sqlx::query(
            "UPDATE comments SET deleted = 1
             WHERE deleted = 0
               AND (author_id = ?1
                    OR discussion_id IN (SELECT id FROM discussions WHERE author_id = ?1))",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let discussions =
            sqlx::query("UPDATE discussions SET deleted = 1 WHERE author_id = ? AND deleted = 0")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

        tx.commit().await?;

        let report = PurgeReport {
            discussions: discussions.rows_affected(),
            comments: comments.rows_affected(),
        };
        debug!(user_id, discussions = report.discussions, comments = report.comments, "user purge applied");
        Ok(report)
    }
}
