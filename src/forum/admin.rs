//! Privileged operations, addressed by domain name.
//!
//! Each method is one call into the registries; composite mutations (ban plus
//! eviction, password plus eviction, domain delete plus cascade) are single
//! store transactions underneath, so concurrent readers never see half of one.

use serde::Serialize;
use tracing::info;

use super::Forum;
use crate::error::Result;
use crate::store::Store;
use crate::types::{ConfigEntry, Domain, DomainId, ForumStats, RoleFlags, User, UserId};

/// Applies every pending migration and reports the versions applied.
pub fn migrate_schema(store: &dyn Store) -> Result<Vec<String>> {
    let applied = store.migrate_to_latest()?;
    info!(versions = ?applied, "Schema migrated");
    Ok(applied)
}

/// Which sessions `drop_sessions` removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionScope {
    Domain(String),
    All,
}

impl SessionScope {
    /// `*` selects every domain; anything else is a domain name.
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        if arg == "*" {
            SessionScope::All
        } else {
            SessionScope::Domain(arg.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainInfo {
    pub domain: Domain,
    pub stats: ForumStats,
    pub config: Vec<ConfigEntry>,
}

pub struct ControlPlane<'a> {
    forum: &'a Forum,
}

impl<'a> ControlPlane<'a> {
    pub(crate) fn new(forum: &'a Forum) -> Self {
        Self { forum }
    }

    fn domain_id(&self, domain_name: &str) -> Result<DomainId> {
        Ok(self.forum.domains().get(domain_name)?.id)
    }

    pub fn create_domain(&self, domain_name: &str, forum_name: &str) -> Result<DomainId> {
        let id = self.forum.domains().create(domain_name, forum_name)?;
        info!(domain = domain_name, id, "Domain created");
        Ok(id)
    }

    pub fn rename_domain(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.forum.domains().rename(old_name, new_name)?;
        info!(from = old_name, to = new_name, "Domain renamed");
        Ok(())
    }

    pub fn set_forum_name(&self, domain_name: &str, forum_name: &str) -> Result<()> {
        self.forum.domains().set_forum_name(domain_name, forum_name)?;
        info!(domain = domain_name, "Forum name updated");
        Ok(())
    }

    pub fn delete_domain(&self, domain_name: &str) -> Result<()> {
        self.forum.domains().delete(domain_name)?;
        info!(domain = domain_name, "Domain deleted");
        Ok(())
    }

    pub fn create_user(
        &self,
        domain_name: &str,
        username: &str,
        password: &str,
        roles: RoleFlags,
        email: Option<&str>,
    ) -> Result<UserId> {
        let domain_id = self.domain_id(domain_name)?;
        let id = self
            .forum
            .users()
            .create_with_email(domain_id, username, password, roles, email)?;
        info!(domain = domain_name, username, roles = %roles, "User created");
        Ok(id)
    }

    pub fn create_admin_user(&self, domain_name: &str, username: &str, password: &str) -> Result<UserId> {
        self.create_user(domain_name, username, password, RoleFlags::ADMIN, None)
    }

    /// Rotates a password. Sessions survive unless `evict_sessions` is set.
    pub fn change_password(
        &self,
        domain_name: &str,
        username: &str,
        new_password: &str,
        evict_sessions: bool,
    ) -> Result<()> {
        let domain_id = self.domain_id(domain_name)?;
        let users = self.forum.users();
        if evict_sessions {
            users.change_password_and_evict_sessions(domain_id, username, new_password)?;
        } else {
            users.change_password(domain_id, username, new_password)?;
        }
        info!(domain = domain_name, username, evict_sessions, "Password changed");
        Ok(())
    }

    /// Bans a user and drops their sessions in one transaction.
    pub fn ban_user(&self, domain_name: &str, username: &str) -> Result<usize> {
        let domain_id = self.domain_id(domain_name)?;
        let evicted = self.forum.users().set_banned(domain_id, username, true)?;
        info!(domain = domain_name, username, sessions = evicted, "User banned");
        Ok(evicted)
    }

    /// Clears the ban flag. Sessions dropped by the ban stay dropped.
    pub fn unban_user(&self, domain_name: &str, username: &str) -> Result<()> {
        let domain_id = self.domain_id(domain_name)?;
        self.forum.users().set_banned(domain_id, username, false)?;
        info!(domain = domain_name, username, "User unbanned");
        Ok(())
    }

    pub fn set_roles(&self, domain_name: &str, username: &str, roles: RoleFlags) -> Result<()> {
        let domain_id = self.domain_id(domain_name)?;
        self.forum.users().set_roles(domain_id, username, roles)?;
        info!(domain = domain_name, username, roles = %roles, "Roles updated");
        Ok(())
    }

    pub fn logout_user(&self, domain_name: &str, username: &str) -> Result<usize> {
        let domain_id = self.domain_id(domain_name)?;
        let user = self.forum.users().get(domain_id, username)?;
        let dropped = self.forum.sessions().destroy_all_for_user(domain_id, user.id)?;
        info!(domain = domain_name, username, sessions = dropped, "User logged out");
        Ok(dropped)
    }

    pub fn delete_user(&self, domain_name: &str, username: &str) -> Result<()> {
        let domain_id = self.domain_id(domain_name)?;
        self.forum.users().delete(domain_id, username)?;
        info!(domain = domain_name, username, "User deleted");
        Ok(())
    }

    /// Read-only blocks writes in the content layer; sessions are kept.
    pub fn set_read_only(&self, domain_name: &str, read_only: bool) -> Result<()> {
        self.forum.domains().set_read_only(domain_name, read_only)?;
        info!(domain = domain_name, read_only, "Read-only mode updated");
        Ok(())
    }

    pub fn set_signup_disabled(&self, domain_name: &str, disabled: bool) -> Result<()> {
        self.forum.domains().set_signup_disabled(domain_name, disabled)?;
        info!(domain = domain_name, signup_disabled = disabled, "Signup setting updated");
        Ok(())
    }

    pub fn set_config(&self, domain_name: &str, key: &str, value: &str) -> Result<()> {
        self.forum.domains().set_config(domain_name, key, value)?;
        info!(domain = domain_name, key, "Config updated");
        Ok(())
    }

    /// Operational escape hatch: wipes sessions for one domain or all of them.
    pub fn drop_sessions(&self, scope: &SessionScope) -> Result<usize> {
        let dropped = match scope {
            SessionScope::Domain(name) => {
                let domain_id = self.domain_id(name)?;
                self.forum.sessions().destroy_all_for_domain(domain_id)?
            }
            SessionScope::All => self.forum.sessions().destroy_all()?,
        };
        info!(scope = ?scope, sessions = dropped, "Sessions dropped");
        Ok(dropped)
    }

    pub fn info(&self, domain_name: &str) -> Result<DomainInfo> {
        let domains = self.forum.domains();
        Ok(DomainInfo {
            domain: domains.get(domain_name)?,
            stats: domains.stats(domain_name)?,
            config: domains.list_config(domain_name)?,
        })
    }

    pub fn list_domains(&self) -> Result<Vec<Domain>> {
        self.forum.domains().list()
    }

    pub fn list_users(&self, domain_name: &str) -> Result<Vec<User>> {
        let domain_id = self.domain_id(domain_name)?;
        self.forum.users().list(domain_id)
    }
}
