//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Forum.
//! Discussions and comments share one id space of UUID v7 values so that a
//! raw id can be resolved against either collection.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ForumError;

/// Users live in the relational user domain and are referenced by number.
pub type UserId = i64;

/// Opaque, store-generated identifier of a discussion or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Generates a fresh time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a raw id, returning `None` when it is malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ElementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Actor role as issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    /// The moderation role: may bypass ownership when deleting comments and
    /// may ban or unban users.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ForumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(ForumError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// The authenticated identity behind a request, threaded explicitly through
/// every service call. The ban flag is not part of it: services read that
/// from the user directory on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn customer(user_id: UserId) -> Self {
        Self::new(user_id, Role::Customer)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// A user record from the relational user domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub banned: bool,
}

/// Moderator action applied to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanAction {
    Ban,
    Unban,
}

impl FromStr for BanAction {
    type Err = ForumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ban" => Ok(BanAction::Ban),
            "unban" => Ok(BanAction::Unban),
            other => Err(ForumError::Validation(format!(
                "action must be 'ban' or 'unban', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Like => "like",
            VoteKind::Dislike => "dislike",
        }
    }
}

impl FromStr for VoteKind {
    type Err = ForumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(VoteKind::Like),
            "dislike" => Ok(VoteKind::Dislike),
            other => Err(ForumError::Validation(format!(
                "vote must be 'like' or 'dislike', got '{other}'"
            ))),
        }
    }
}

/// The like and dislike membership sets of one element.
///
/// A user id is in at most one of the two sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub liked_by: BTreeSet<UserId>,
    pub disliked_by: BTreeSet<UserId>,
}

impl Votes {
    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn dislikes(&self) -> usize {
        self.disliked_by.len()
    }

    /// The vote currently held by `user_id`, if any.
    pub fn vote_of(&self, user_id: UserId) -> Option<VoteKind> {
        if self.liked_by.contains(&user_id) {
            Some(VoteKind::Like)
        } else if self.disliked_by.contains(&user_id) {
            Some(VoteKind::Dislike)
        } else {
            None
        }
    }

    /// Records a membership row read back from storage.
    pub fn insert(&mut self, user_id: UserId, kind: VoteKind) {
        self.liked_by.remove(&user_id);
        self.disliked_by.remove(&user_id);
        match kind {
            VoteKind::Like => self.liked_by.insert(user_id),
            VoteKind::Dislike => self.disliked_by.insert(user_id),
        };
    }
}

/// A top-level forum topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: ElementId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    /// Deleted discussions stay in storage but are invisible to every read.
    pub deleted: bool,
    pub votes: Votes,
}

/// A reply within a discussion, optionally threaded under another comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: ElementId,
    pub discussion_id: ElementId,
    /// Parent comment for threading; `None` for a root comment.
    pub related_to: Option<ElementId>,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub deleted: bool,
    pub votes: Votes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDiscussion {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub discussion_id: ElementId,
    pub related_to: Option<ElementId>,
    pub content: String,
    pub author_id: UserId,
}

/// Listing row: vote counts are derived from set sizes at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionSummary {
    pub id: ElementId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub likes: usize,
    pub dislikes: usize,
    /// Live comments only.
    pub comment_count: u64,
}

/// The two collections sharing the element id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Discussion,
    Comment,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Discussion => "discussion",
            ElementKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live element addressed by kind and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: ElementId,
}

impl ElementRef {
    pub fn discussion(id: ElementId) -> Self {
        Self { kind: ElementKind::Discussion, id }
    }

    pub fn comment(id: ElementId) -> Self {
        Self { kind: ElementKind::Comment, id }
    }
}

/// Outcome of resolving a raw id against both collections in one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementLookup {
    Discussion(ElementId),
    Comment(ElementId),
    NotFound,
    /// The id matched a live discussion and a live comment at once.
    Ambiguous,
}

impl ElementLookup {
    /// Builds the lookup result from the liveness of each collection.
    pub fn from_liveness(id: ElementId, discussion_live: bool, comment_live: bool) -> Self {
        match (discussion_live, comment_live) {
            (true, false) => ElementLookup::Discussion(id),
            (false, true) => ElementLookup::Comment(id),
            (true, true) => ElementLookup::Ambiguous,
            (false, false) => ElementLookup::NotFound,
        }
    }

    pub fn target(&self) -> Option<ElementRef> {
        match *self {
            ElementLookup::Discussion(id) => Some(ElementRef::discussion(id)),
            ElementLookup::Comment(id) => Some(ElementRef::comment(id)),
            ElementLookup::NotFound | ElementLookup::Ambiguous => None,
        }
    }
}

/// Rows newly soft-deleted by a purge; both are zero when the purge is re-run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub discussions: u64,
    pub comments: u64,
}

/// Outcome of an owner or moderator discussion delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub discussion_deleted: bool,
    pub comments: u64,
}
