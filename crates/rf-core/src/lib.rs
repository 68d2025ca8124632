//! rusty-forum/crates/rf-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Forum.

pub mod error;
pub mod models;
pub mod traits;
pub mod tree;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
pub use tree::{build_tree, CommentForest, ThreadedComment, DELETED_PLACEHOLDER};
pub use validation::{ContentValidator, ValidationLimits};
