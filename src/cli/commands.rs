use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "orangeforum")]
#[command(version, about = "Multi-tenant forum server and administration tool", long_about = None)]
pub struct Cli {
    /// Data directory holding the database
    #[arg(long, global = true, env = "ORANGEFORUM_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// TOML configuration file
    #[arg(long, global = true, env = "ORANGEFORUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fail instead of prompting for missing values
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct DomainArg {
    /// Domain name (the forum's hostname)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args)]
pub struct UserArgs {
    /// Domain name (the forum's hostname)
    #[arg(long)]
    pub domain: Option<String>,

    /// Username within the domain
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or upgrade the database schema
    MigrateSchema,

    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Create a new domain
    CreateDomain {
        #[command(flatten)]
        domain: DomainArg,

        /// Display name of the forum
        #[arg(long)]
        forum_name: Option<String>,
    },

    /// Rename a domain
    RenameDomain {
        #[command(flatten)]
        domain: DomainArg,

        /// New domain name
        #[arg(long)]
        new_name: Option<String>,
    },

    /// List all domains
    ListDomains {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a domain and everything in it
    DeleteDomain {
        #[command(flatten)]
        domain: DomainArg,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Change a forum's display name
    SetForumName {
        #[command(flatten)]
        domain: DomainArg,

        /// Display name of the forum
        #[arg(long)]
        forum_name: Option<String>,
    },

    /// Create a user
    CreateUser {
        #[command(flatten)]
        user: UserArgs,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Grant the moderator role
        #[arg(long = "mod")]
        moderator: bool,

        /// Read the password from stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Create a user with the admin role
    CreateAdminUser {
        #[command(flatten)]
        user: UserArgs,

        /// Read the password from stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Change a user's password
    ChangePassword {
        #[command(flatten)]
        user: UserArgs,

        /// Also log the user out everywhere
        #[arg(long)]
        evict_sessions: bool,

        /// Read the password from stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Ban a user and drop their sessions
    BanUser {
        #[command(flatten)]
        user: UserArgs,
    },

    /// Lift a ban
    UnbanUser {
        #[command(flatten)]
        user: UserArgs,
    },

    /// Set a user's roles
    SetRoles {
        #[command(flatten)]
        user: UserArgs,

        /// Comma-separated roles: user, mod, admin
        #[arg(long)]
        roles: Option<String>,
    },

    /// List the users of a domain
    ListUsers {
        #[command(flatten)]
        domain: DomainArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a user
    DeleteUser {
        #[command(flatten)]
        user: UserArgs,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Drop every session of one user
    LogoutUser {
        #[command(flatten)]
        user: UserArgs,
    },

    /// Put a domain in read-only mode
    EnableReadonly {
        #[command(flatten)]
        domain: DomainArg,
    },

    /// Take a domain out of read-only mode
    DisableReadonly {
        #[command(flatten)]
        domain: DomainArg,
    },

    /// Allow new users to sign up
    EnableSignup {
        #[command(flatten)]
        domain: DomainArg,
    },

    /// Stop new users from signing up
    DisableSignup {
        #[command(flatten)]
        domain: DomainArg,
    },

    /// Set a domain configuration value
    SetConfig {
        #[command(flatten)]
        domain: DomainArg,

        /// Configuration key
        #[arg(long)]
        key: Option<String>,

        /// Configuration value
        #[arg(long)]
        value: Option<String>,
    },

    /// Drop sessions for one domain, or for all domains with '*'
    DropSessions {
        /// Domain name or '*'
        scope: Option<String>,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Show schema and domain status
    Info {
        /// Limit output to one domain
        #[arg(long)]
        domain: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
