//! # Orangeforum
//!
//! Backend of a multi-tenant discussion forum: many domains (one per hostname)
//! share a single SQLite store and stay isolated from each other.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! orangeforum = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orangeforum::forum::{Forum, SessionPolicy, migrate_schema};
//! use orangeforum::store::SqliteStore;
//! use orangeforum::types::RoleFlags;
//!
//! let store = SqliteStore::new("./data/orangeforum.db")?;
//! migrate_schema(&store)?;
//!
//! let forum = Forum::open(Arc::new(store), SessionPolicy::default())?;
//! let admin = forum.admin();
//! admin.create_domain("a.example", "Alpha")?;
//! admin.create_user("a.example", "alice", "pw1", RoleFlags::USER, None)?;
//!
//! let domain = forum.domains().get("a.example")?;
//! let (_user, token) = forum.login(domain.id, "alice", "pw1")?;
//! let user_id = forum.sessions().resolve(domain.id, &token)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the administrative CLI. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod forum;
pub mod server;
pub mod store;
pub mod types;
pub mod validation;
