use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rf_core::{Role, UserId};

#[derive(Debug, Parser)]
#[command(name = "rusty-forum", version, about = "Moderated discussion forum engine")]
pub struct Cli {
    /// Configuration file; `./rusty-forum.toml` is used when present.
    #[arg(long, global = true, env = "RF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Id of the user the command acts as.
    #[arg(long = "as-user", global = true, env = "RF_AS_USER")]
    pub as_user: Option<UserId>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Discussion,
    Comment,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database if needed and apply pending migrations.
    Migrate,
    /// Register a user account.
    AddUser {
        username: String,
        #[arg(long, default_value = "customer")]
        role: Role,
    },
    /// List live discussions with vote and comment counts.
    List,
    /// Relevance-ranked search over titles and content.
    Search { term: String },
    /// Show a discussion with its comment thread.
    Show { id: String },
    /// Start a discussion.
    Post { title: String, content: String },
    /// Comment on a discussion, optionally in reply to another comment.
    Comment {
        discussion_id: String,
        content: String,
        #[arg(long)]
        reply_to: Option<String>,
    },
    /// Like or dislike a discussion or comment.
    Vote { element_id: String, vote: String },
    /// Withdraw a vote.
    Unvote { element_id: String },
    /// Replace the content of your own discussion or comment.
    Edit {
        #[arg(value_enum)]
        target: Target,
        id: String,
        content: String,
    },
    /// Soft-delete a discussion (with its comments) or a single comment.
    Delete {
        #[arg(value_enum)]
        target: Target,
        id: String,
    },
    /// Ban a user and purge everything they wrote.
    Ban { user_id: UserId },
    /// Lift a ban; purged content stays deleted.
    Unban { user_id: UserId },
    /// Re-run the history purge for a user.
    Purge { user_id: UserId },
}
