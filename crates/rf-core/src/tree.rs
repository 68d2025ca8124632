//! # Comment Tree Builder
//!
//! Rebuilds the reply hierarchy of a discussion from its flat comment list.
//!
//! The forest is a pure function of its input. Walking it is lazy and can be
//! restarted any number of times: `roots()` and `children()` hand out fresh
//! iterators over an index built once in [`CommentForest::new`]. Siblings keep
//! storage order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Comment, ElementId, UserId};

/// Rendered in place of the content of a deleted comment.
pub const DELETED_PLACEHOLDER: &str = "<deleted>";

pub struct CommentForest {
    comments: Vec<Comment>,
    /// Parent id (`None` for roots) to child positions in `comments`.
    children: HashMap<Option<ElementId>, Vec<usize>>,
}

impl CommentForest {
    pub fn new(comments: Vec<Comment>) -> Self {
        let mut children: HashMap<Option<ElementId>, Vec<usize>> = HashMap::new();
        for (index, comment) in comments.iter().enumerate() {
            children.entry(comment.related_to).or_default().push(index);
        }
        Self { comments, children }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Comments without a parent, in storage order.
    pub fn roots(&self) -> Branch<'_> {
        self.branch(None)
    }

    /// Materializes the whole forest into owned, serializable nodes.
    pub fn to_threads(&self) -> Vec<ThreadedComment> {
        self.roots().map(|node| node.to_thread()).collect()
    }

    fn branch(&self, parent: Option<ElementId>) -> Branch<'_> {
        let positions = self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[]);
        Branch { forest: self, positions: positions.iter() }
    }
}

/// Iterator over the direct children of one node (or over the roots).
#[derive(Clone)]
pub struct Branch<'a> {
    forest: &'a CommentForest,
    positions: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for Branch<'a> {
    type Item = CommentNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.positions.next()?;
        let comment = self.forest.comments.get(index)?;
        Some(CommentNode { forest: self.forest, comment })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

#[derive(Clone, Copy)]
pub struct CommentNode<'a> {
    forest: &'a CommentForest,
    comment: &'a Comment,
}

impl<'a> CommentNode<'a> {
    pub fn comment(&self) -> &'a Comment {
        self.comment
    }

    pub fn id(&self) -> ElementId {
        self.comment.id
    }

    /// The visible content: the placeholder once the comment is deleted.
    pub fn content(&self) -> &'a str {
        if self.comment.deleted {
            DELETED_PLACEHOLDER
        } else {
            &self.comment.content
        }
    }

    pub fn children(&self) -> Branch<'a> {
        self.forest.branch(Some(self.comment.id))
    }

    /// Materializes this node and everything below it.
    ///
    /// Depth-first with an explicit stack of `(node, unvisited children)`;
    /// a finished node is attached to the frame beneath it, so reply depth
    /// never turns into call depth. Every node reached from a root has an
    /// ancestor chain ending at that root, so a self-referencing or cyclic
    /// group is never entered.
    pub fn to_thread(&self) -> ThreadedComment {
        let mut stack: Vec<(ThreadedComment, Branch<'a>)> = vec![(self.leaf(), self.children())];
        let mut finished_root = None;

        while let Some((_, pending)) = stack.last_mut() {
            if let Some(child) = pending.next() {
                stack.push((child.leaf(), child.children()));
                continue;
            }
            if let Some((done, _)) = stack.pop() {
                match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(done),
                    None => finished_root = Some(done),
                }
            }
        }

        finished_root.unwrap_or_else(|| self.leaf())
    }

    fn leaf(&self) -> ThreadedComment {
        let comment = self.comment;
        ThreadedComment {
            id: comment.id,
            content: self.content().to_owned(),
            author_id: comment.author_id,
            created_at: comment.created_at,
            edited: comment.edited,
            deleted: comment.deleted,
            likes: comment.votes.likes(),
            dislikes: comment.votes.dislikes(),
            children: Vec::new(),
        }
    }
}

/// Read-side comment with its replies nested beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadedComment {
    pub id: ElementId,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub deleted: bool,
    pub likes: usize,
    pub dislikes: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ThreadedComment>,
}

// Flattens the subtree before it is freed; the derived drop glue would
// recurse once per reply level.
impl Drop for ThreadedComment {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Convenience wrapper over [`CommentForest`] for one-shot rendering.
pub fn build_tree(comments: Vec<Comment>) -> Vec<ThreadedComment> {
    CommentForest::new(comments).to_threads()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Votes;

    fn comment(id: ElementId, discussion: ElementId, related_to: Option<ElementId>, body: &str) -> Comment {
        Comment {
            id,
            discussion_id: discussion,
            related_to,
            content: body.to_string(),
            author_id: 7,
            created_at: Utc::now(),
            edited: false,
            deleted: false,
            votes: Votes::default(),
        }
    }

    fn chain() -> (Vec<ElementId>, Vec<Comment>) {
        let discussion = ElementId::generate();
        let ids: Vec<ElementId> = (0..3).map(|_| ElementId::generate()).collect();
        let comments = vec![
            comment(ids[0], discussion, None, "first"),
            comment(ids[1], discussion, Some(ids[0]), "second"),
            comment(ids[2], discussion, Some(ids[1]), "third"),
        ];
        (ids, comments)
    }

    #[test]
    fn nests_a_reply_chain() {
        let (ids, comments) = chain();
        let tree = build_tree(comments);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, ids[0]);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, ids[1]);
        assert_eq!(tree[0].children[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].id, ids[2]);
        assert!(tree[0].children[0].children[0].children.is_empty());
    }

    #[test]
    fn deleted_comment_keeps_position_but_hides_content() {
        let (ids, mut comments) = chain();
        comments[1].deleted = true;
        let tree = build_tree(comments);

        let middle = &tree[0].children[0];
        assert_eq!(middle.id, ids[1]);
        assert_eq!(middle.content, DELETED_PLACEHOLDER);
        assert!(middle.deleted);
        assert_eq!(middle.children[0].content, "third");
    }

    #[test]
    fn siblings_keep_storage_order() {
        let discussion = ElementId::generate();
        let root = ElementId::generate();
        let replies: Vec<ElementId> = (0..4).map(|_| ElementId::generate()).collect();
        let mut comments = vec![comment(root, discussion, None, "root")];
        // Insert replies in reverse id order to prove no re-sort happens.
        for id in replies.iter().rev() {
            comments.push(comment(*id, discussion, Some(root), "reply"));
        }

        let forest = CommentForest::new(comments);
        let order: Vec<ElementId> = forest.roots().next().unwrap().children().map(|c| c.id()).collect();
        let expected: Vec<ElementId> = replies.iter().rev().copied().collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn walking_is_restartable() {
        let (_, comments) = chain();
        let forest = CommentForest::new(comments);

        let first: Vec<ElementId> = forest.roots().map(|n| n.id()).collect();
        let second: Vec<ElementId> = forest.roots().map(|n| n.id()).collect();
        assert_eq!(first, second);
        assert_eq!(forest.to_threads(), forest.to_threads());
    }

    #[test]
    fn self_reference_is_never_reached() {
        let discussion = ElementId::generate();
        let looped = ElementId::generate();
        let forest = CommentForest::new(vec![comment(looped, discussion, Some(looped), "loop")]);

        assert_eq!(forest.len(), 1);
        assert!(forest.to_threads().is_empty());
    }

    #[test]
    fn deep_reply_chain_builds_without_recursion() {
        const DEPTH: usize = 20_000;
        let discussion = ElementId::generate();
        let mut comments = Vec::with_capacity(DEPTH);
        let mut parent = None;
        for _ in 0..DEPTH {
            let id = ElementId::generate();
            comments.push(comment(id, discussion, parent, "deeper"));
            parent = Some(id);
        }
        let last = parent;

        let tree = build_tree(comments);
        assert_eq!(tree.len(), 1);

        let mut depth = 1;
        let mut node = &tree[0];
        while let Some(child) = node.children.first() {
            assert_eq!(node.children.len(), 1);
            depth += 1;
            node = child;
        }
        assert_eq!(depth, DEPTH);
        assert_eq!(Some(node.id), last);
    }

    #[test]
    fn leaf_children_are_omitted_from_json() {
        let discussion = ElementId::generate();
        let tree = build_tree(vec![comment(ElementId::generate(), discussion, None, "solo")]);
        let json = serde_json::to_value(&tree).unwrap();
        assert!(json[0].get("children").is_none());
        assert_eq!(json[0]["content"], "solo");
    }
}
