use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Domain, User, UserId};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DomainResponse {
    pub domain_name: String,
    pub forum_name: String,
    pub read_only: bool,
    pub signup_disabled: bool,
}

impl From<Domain> for DomainResponse {
    fn from(domain: Domain) -> Self {
        Self {
            domain_name: domain.domain_name,
            forum_name: domain.forum_name,
            read_only: domain.read_only,
            signup_disabled: domain.signup_disabled,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_admin: bool,
    pub is_mod: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            is_mod: user.is_mod,
            created_at: user.created_at,
        }
    }
}

/// Returned by login and signup. The token is shown once.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutAllResponse {
    pub sessions: usize,
}
