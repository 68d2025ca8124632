//! Row types mapping SQLite records back to domain models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rf_core::models::{Comment, Discussion, DiscussionSummary, ElementId, VoteKind, Votes};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(FromRow)]
pub(crate) struct DiscussionRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub deleted: bool,
}

impl DiscussionRow {
    pub fn into_discussion(self, votes: Votes) -> Discussion {
        Discussion {
            id: ElementId::from_uuid(self.id),
            title: self.title,
            content: self.content,
            author_id: self.author_id,
            created_at: self.created_at,
            edited: self.edited,
            deleted: self.deleted,
            votes,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub discussion_id: Uuid,
    pub related_to: Option<Uuid>,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub deleted: bool,
}

impl CommentRow {
    pub fn into_comment(self, votes: Votes) -> Comment {
        Comment {
            id: ElementId::from_uuid(self.id),
            discussion_id: ElementId::from_uuid(self.discussion_id),
            related_to: self.related_to.map(ElementId::from_uuid),
            content: self.content,
            author_id: self.author_id,
            created_at: self.created_at,
            edited: self.edited,
            deleted: self.deleted,
            votes,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct SummaryRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub likes: i64,
    pub dislikes: i64,
    pub comment_count: i64,
}

impl From<SummaryRow> for DiscussionSummary {
    fn from(row: SummaryRow) -> Self {
        DiscussionSummary {
            id: ElementId::from_uuid(row.id),
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            created_at: row.created_at,
            edited: row.edited,
            likes: usize::try_from(row.likes).unwrap_or(0),
            dislikes: usize::try_from(row.dislikes).unwrap_or(0),
            comment_count: u64::try_from(row.comment_count).unwrap_or(0),
        }
    }
}

#[derive(FromRow)]
pub(crate) struct VoteRow {
    pub element_id: Uuid,
    pub user_id: i64,
    pub kind: String,
}

/// Folds vote rows into membership sets keyed by element.
pub(crate) fn group_votes(rows: Vec<VoteRow>) -> anyhow::Result<HashMap<ElementId, Votes>> {
    let mut grouped: HashMap<ElementId, Votes> = HashMap::new();
    for row in rows {
        let kind: VoteKind = row.kind.parse()?;
        grouped
            .entry(ElementId::from_uuid(row.element_id))
            .or_default()
            .insert(row.user_id, kind);
    }
    Ok(grouped)
}
