//! # Rusty-Forum Binary
//!
//! The entry point that assembles the forum from the storage plugin enabled
//! at compile time and runs one command against it, printing JSON.

mod cli;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use rf_configs::{LoggingSettings, Settings};
use rf_core::{Actor, BanAction, ContentValidator, ForumError, UserDirectory, UserId};
use rf_services::{ForumService, ModerationService};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, Target};

#[cfg(feature = "db-sqlite")]
use rf_db_sqlite::SqliteForumStore;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("rusty-forum needs a storage backend; enable the `db-sqlite` feature");

struct App {
    forum: ForumService,
    moderation: ModerationService,
    users: Arc<dyn UserDirectory>,
    as_user: Option<UserId>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&settings.logging);

    let store = Arc::new(
        SqliteForumStore::connect(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
        )
        .await
        .context("opening the forum store")?,
    );
    let validator = ContentValidator::new(settings.limits).context("compiling content rules")?;

    let app = App {
        forum: ForumService::new(store.clone(), store.clone(), store.clone(), validator),
        moderation: ModerationService::new(store.clone(), store.clone()),
        users: store,
        as_user: cli.as_user,
    };

    let output = app.run(cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Logs go to stderr so stdout carries only the command's JSON.
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

impl App {
    async fn run(&self, command: Command) -> anyhow::Result<Value> {
        let output = match command {
            Command::Migrate => {
                info!("database is up to date");
                json!({ "migrated": true })
            }
            Command::AddUser { username, role } => {
                let id = self
                    .users
                    .create_user(username.trim(), role)
                    .await
                    .with_context(|| format!("creating user '{username}'"))?;
                json!({ "id": id, "username": username.trim(), "role": role })
            }
            Command::List => to_json(self.forum.list_discussions().await?)?,
            Command::Search { term } => to_json(self.forum.search_discussions(&term).await?)?,
            Command::Show { id } => to_json(self.forum.get_discussion_with_comments(&id).await?)?,
            Command::Post { title, content } => {
                let actor = self.actor().await?;
                let id = self.forum.create_discussion(&actor, &title, &content).await?;
                json!({ "id": id })
            }
            Command::Comment { discussion_id, content, reply_to } => {
                let actor = self.actor().await?;
                let id = self
                    .forum
                    .create_comment(&actor, &discussion_id, reply_to.as_deref(), &content)
                    .await?;
                json!({ "id": id })
            }
            Command::Vote { element_id, vote } => {
                let actor = self.actor().await?;
                let target = self.forum.vote(&actor, &element_id, &vote).await?;
                json!({ "id": target.id, "kind": target.kind, "vote": vote.trim() })
            }
            Command::Unvote { element_id } => {
                let actor = self.actor().await?;
                let target = self.forum.retract_vote(&actor, &element_id).await?;
                json!({ "id": target.id, "kind": target.kind, "vote": Value::Null })
            }
            Command::Edit { target, id, content } => {
                let actor = self.actor().await?;
                match target {
                    Target::Discussion => to_json(self.forum.update_discussion(&actor, &id, &content).await?)?,
                    Target::Comment => to_json(self.forum.update_comment(&actor, &id, &content).await?)?,
                }
            }
            Command::Delete { target, id } => {
                let actor = self.actor().await?;
                match target {
                    Target::Discussion => to_json(self.moderation.delete_discussion(&actor, &id).await?)?,
                    Target::Comment => {
                        self.moderation.delete_comment(&actor, &id).await?;
                        json!({ "id": id, "deleted": true })
                    }
                }
            }
            Command::Ban { user_id } => {
                let actor = self.actor().await?;
                to_json(self.moderation.set_ban_status(&actor, user_id, BanAction::Ban).await?)?
            }
            Command::Unban { user_id } => {
                let actor = self.actor().await?;
                to_json(self.moderation.set_ban_status(&actor, user_id, BanAction::Unban).await?)?
            }
            Command::Purge { user_id } => {
                let actor = self.actor().await?;
                if !actor.is_moderator() {
                    return Err(ForumError::Forbidden(format!(
                        "user {} may not purge user histories",
                        actor.user_id
                    ))
                    .into());
                }
                to_json(self.moderation.purge_full_history(user_id).await?)?
            }
        };
        Ok(output)
    }

    /// Loads the acting user fresh so role and ban flag are current.
    async fn actor(&self) -> anyhow::Result<Actor> {
        let Some(user_id) = self.as_user else {
            bail!("this command needs --as-user <ID>");
        };
        let user = self
            .users
            .get_user(user_id)
            .await
            .with_context(|| format!("loading user {user_id}"))?
            .ok_or_else(|| ForumError::not_found("user", user_id))?;
        Ok(Actor::from(&user))
    }
}

fn to_json<T: Serialize>(value: T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}
