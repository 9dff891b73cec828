mod commands;
mod domain;
mod prompt;
mod schema;
mod serve;
mod session;
mod user;

pub use commands::{Cli, Commands, DomainArg, UserArgs};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ForumConfig;
use crate::error::Error;
use crate::forum::Forum;
use crate::store::SqliteStore;

/// Everything a subcommand needs besides its own arguments.
pub struct Context {
    pub data_dir: PathBuf,
    pub config: ForumConfig,
    pub non_interactive: bool,
}

impl Context {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        Ok(Self {
            data_dir: cli.data_dir.clone(),
            config: ForumConfig::load(cli.config.as_deref())?,
            non_interactive: cli.non_interactive,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.db_path(&self.data_dir)
    }

    /// Opens an existing database file.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let db_path = self.db_path();
        if !db_path.exists() {
            anyhow::bail!(
                "Database not found at {}. Run 'orangeforum migrate-schema' first.",
                db_path.display()
            );
        }
        Ok(SqliteStore::with_busy_timeout(&db_path, self.config.busy_timeout())?)
    }

    /// Opens the store and checks it is at the schema version this build expects.
    pub fn open_forum(&self) -> anyhow::Result<Forum> {
        let store = self.open_store()?;
        match Forum::open(Arc::new(store), self.config.session_policy()?) {
            Ok(forum) => Ok(forum),
            Err(Error::SchemaMismatch { found: None, .. }) => anyhow::bail!(
                "Database schema not initialized. Run 'orangeforum migrate-schema' first."
            ),
            Err(e @ Error::SchemaMismatch { .. }) => {
                anyhow::bail!("{e}. Run 'orangeforum migrate-schema' to upgrade.")
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Dispatches one subcommand to its handler.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::new(&cli)?;

    match cli.command {
        Commands::MigrateSchema => schema::run_migrate_schema(&ctx),
        Commands::Serve { host, port } => serve::run_serve(&ctx, host, port).await,
        Commands::CreateDomain { domain, forum_name } => {
            domain::run_create_domain(&ctx, domain.domain, forum_name)
        }
        Commands::RenameDomain { domain, new_name } => {
            domain::run_rename_domain(&ctx, domain.domain, new_name)
        }
        Commands::ListDomains { json } => domain::run_list_domains(&ctx, json),
        Commands::DeleteDomain { domain, yes } => domain::run_delete_domain(&ctx, domain.domain, yes),
        Commands::SetForumName { domain, forum_name } => {
            domain::run_set_forum_name(&ctx, domain.domain, forum_name)
        }
        Commands::CreateUser {
            user,
            email,
            moderator,
            password_stdin,
        } => user::run_create_user(&ctx, user, email, moderator, password_stdin),
        Commands::CreateAdminUser {
            user,
            password_stdin,
        } => user::run_create_admin_user(&ctx, user, password_stdin),
        Commands::ChangePassword {
            user,
            evict_sessions,
            password_stdin,
        } => user::run_change_password(&ctx, user, evict_sessions, password_stdin),
        Commands::BanUser { user } => user::run_ban_user(&ctx, user),
        Commands::UnbanUser { user } => user::run_unban_user(&ctx, user),
        Commands::SetRoles { user, roles } => user::run_set_roles(&ctx, user, roles),
        Commands::ListUsers { domain, json } => user::run_list_users(&ctx, domain.domain, json),
        Commands::DeleteUser { user, yes } => user::run_delete_user(&ctx, user, yes),
        Commands::LogoutUser { user } => user::run_logout_user(&ctx, user),
        Commands::EnableReadonly { domain } => domain::run_set_read_only(&ctx, domain.domain, true),
        Commands::DisableReadonly { domain } => {
            domain::run_set_read_only(&ctx, domain.domain, false)
        }
        Commands::EnableSignup { domain } => {
            domain::run_set_signup_disabled(&ctx, domain.domain, false)
        }
        Commands::DisableSignup { domain } => {
            domain::run_set_signup_disabled(&ctx, domain.domain, true)
        }
        Commands::SetConfig { domain, key, value } => {
            domain::run_set_config(&ctx, domain.domain, key, value)
        }
        Commands::DropSessions { scope, yes } => session::run_drop_sessions(&ctx, scope, yes),
        Commands::Info { domain, json } => domain::run_info(&ctx, domain, json),
    }
}
