use chrono::{Duration, Utc};
use tracing::warn;

use crate::auth::{generate_session_token, is_well_formed};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{DomainId, UserId};

const CREATE_ATTEMPTS: usize = 3;

/// Expiry rule layered over session `created_at`. No expiry by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionPolicy {
    pub max_age: Option<Duration>,
}

impl SessionPolicy {
    /// Zero or negative days mean no expiry.
    pub fn with_max_age_days(days: Option<i64>) -> Result<Self> {
        let max_age = match days.filter(|d| *d > 0) {
            None => None,
            Some(d) => Some(Duration::try_days(d).ok_or_else(|| {
                Error::Config(format!("sessions.max_age_days out of range: {d}"))
            })?),
        };
        Ok(Self { max_age })
    }
}

/// Session store: opaque tokens bound to a (domain, user) pair.
pub struct Sessions<'a> {
    store: &'a dyn Store,
    policy: SessionPolicy,
}

impl<'a> Sessions<'a> {
    pub(crate) fn new(store: &'a dyn Store, policy: SessionPolicy) -> Self {
        Self { store, policy }
    }

    /// Issues a new token for a user of this domain.
    pub fn create(&self, domain_id: DomainId, user_id: UserId) -> Result<String> {
        for _ in 0..CREATE_ATTEMPTS {
            let token = generate_session_token();
            match self.store.create_session(domain_id, user_id, &token) {
                Ok(_) => return Ok(token),
                Err(Error::TokenCollision) => {
                    warn!(domain_id, "Session token collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::TokenCollision)
    }

    /// Resolves a token to its user. The owner's ban flag is re-checked on
    /// every call, so a session that outlives a ban still fails.
    pub fn resolve(&self, domain_id: DomainId, token: &str) -> Result<UserId> {
        if !is_well_formed(token) {
            return Err(Error::NotFound("session"));
        }

        let resolved = self
            .store
            .resolve_session(domain_id, token)?
            .ok_or(Error::NotFound("session"))?;

        if resolved.user_banned {
            return Err(Error::UserBanned);
        }
        if let Some(max_age) = self.policy.max_age {
            // An expiry past the end of representable time never arrives.
            let expires_at = resolved.session.created_at.checked_add_signed(max_age);
            if expires_at.is_some_and(|at| at < Utc::now()) {
                return Err(Error::SessionExpired);
            }
        }

        Ok(resolved.session.user_id)
    }

    /// Logs out one session. Destroying an absent token is not an error.
    pub fn destroy(&self, domain_id: DomainId, token: &str) -> Result<()> {
        self.store.delete_session(domain_id, token)?;
        Ok(())
    }

    pub fn destroy_all_for_user(&self, domain_id: DomainId, user_id: UserId) -> Result<usize> {
        self.store.delete_user_sessions(domain_id, user_id)
    }

    pub fn destroy_all_for_domain(&self, domain_id: DomainId) -> Result<usize> {
        self.store.delete_domain_sessions(domain_id)
    }

    pub fn destroy_all(&self) -> Result<usize> {
        self.store.delete_all_sessions()
    }
}
