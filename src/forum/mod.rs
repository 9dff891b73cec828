//! The tenant-aware core: one [`Forum`] handle owns the store and the
//! credential store, and hands out the registries that operate on them.

mod admin;
mod domains;
mod sessions;
mod users;

pub use admin::{ControlPlane, DomainInfo, SessionScope, migrate_schema};
pub use domains::Domains;
pub use sessions::{SessionPolicy, Sessions};
pub use users::Users;

use std::sync::Arc;

use crate::auth::PasswordHasher;
use crate::error::Result;
use crate::store::Store;
use crate::types::{DomainId, User};

/// Context handle passed to every component; cheap to clone.
#[derive(Clone)]
pub struct Forum {
    store: Arc<dyn Store>,
    hasher: Arc<PasswordHasher>,
    policy: SessionPolicy,
}

impl Forum {
    /// Opens the forum over a store that must already be at the schema
    /// version this build was written against.
    pub fn open(store: Arc<dyn Store>, policy: SessionPolicy) -> Result<Self> {
        store.ensure_latest_schema()?;

        Ok(Self {
            store,
            hasher: Arc::new(PasswordHasher::new()),
            policy,
        })
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    #[must_use]
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.store.as_ref())
    }

    #[must_use]
    pub fn users(&self) -> Users<'_> {
        Users::new(self.store.as_ref(), &self.hasher)
    }

    #[must_use]
    pub fn sessions(&self) -> Sessions<'_> {
        Sessions::new(self.store.as_ref(), self.policy)
    }

    #[must_use]
    pub fn admin(&self) -> ControlPlane<'_> {
        ControlPlane::new(self)
    }

    /// Verifies credentials and issues a session token for the user.
    pub fn login(&self, domain_id: DomainId, username: &str, password: &str) -> Result<(User, String)> {
        let user_id = self.users().verify_credentials(domain_id, username, password)?;
        let token = self.sessions().create(domain_id, user_id)?;
        let user = self.users().get_by_id(domain_id, user_id)?;
        Ok((user, token))
    }
}
