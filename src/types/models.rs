use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RoleFlags;

pub type DomainId = i64;
pub type UserId = i64;

/// A tenant: one forum bound to one hostname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub domain_name: String,
    pub forum_name: String,
    pub signup_disabled: bool,
    pub read_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub domain_id: DomainId,
    pub username: String,
    #[serde(skip)]
    pub passwd_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_admin: bool,
    pub is_mod: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn roles(&self) -> RoleFlags {
        RoleFlags {
            is_admin: self.is_admin,
            is_mod: self.is_mod,
        }
    }
}

/// Fields needed to insert a user. The hash is produced by the credential store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub domain_id: DomainId,
    pub username: String,
    pub passwd_hash: String,
    pub email: Option<String>,
    pub roles: RoleFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub domain_id: DomainId,
    pub user_id: UserId,
    #[serde(skip)]
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// A session row joined with the ban state of its owner, as seen at resolve time.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub session: Session,
    pub user_banned: bool,
}

/// Boolean switches stored directly on the domain row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainFlag {
    ReadOnly,
    SignupDisabled,
}

impl DomainFlag {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            DomainFlag::ReadOnly => "read_only",
            DomainFlag::SignupDisabled => "signup_disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumStats {
    pub users: i64,
    pub sessions: i64,
    pub topics: i64,
    pub comments: i64,
}
