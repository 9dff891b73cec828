pub mod migrate;
mod schema;
mod sqlite;

pub use migrate::{LATEST_VERSION, MIGRATIONS, Migration};
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Every tenant-owned row is addressed by its `domain_id` together with its
/// own key; no method reads or writes users or sessions across domains.
pub trait Store: Send + Sync {
    // Schema operations
    fn current_version(&self) -> Result<Option<String>>;
    fn migrate_to_latest(&self) -> Result<Vec<String>>;
    /// Fails with `SchemaMismatch` unless the store is at `LATEST_VERSION`.
    fn ensure_latest_schema(&self) -> Result<()>;

    // Domain operations
    fn create_domain(&self, domain_name: &str, forum_name: &str) -> Result<DomainId>;
    fn get_domain(&self, id: DomainId) -> Result<Option<Domain>>;
    fn get_domain_by_name(&self, domain_name: &str) -> Result<Option<Domain>>;
    fn list_domains(&self) -> Result<Vec<Domain>>;
    fn rename_domain(&self, old_name: &str, new_name: &str) -> Result<()>;
    fn set_forum_name(&self, domain_name: &str, forum_name: &str) -> Result<()>;
    fn set_domain_flag(&self, domain_name: &str, flag: DomainFlag, value: bool) -> Result<()>;
    fn delete_domain(&self, domain_name: &str) -> Result<bool>;

    // Config operations (domain-scoped key/value)
    fn get_config(&self, domain_id: DomainId, key: &str) -> Result<Option<String>>;
    fn set_config(&self, domain_id: DomainId, key: &str, value: &str) -> Result<()>;
    fn list_config(&self, domain_id: DomainId) -> Result<Vec<ConfigEntry>>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<UserId>;
    fn get_user(&self, domain_id: DomainId, id: UserId) -> Result<Option<User>>;
    fn get_user_by_username(&self, domain_id: DomainId, username: &str) -> Result<Option<User>>;
    fn list_users(&self, domain_id: DomainId) -> Result<Vec<User>>;
    /// Replaces the password hash. With `evict_sessions`, the user's sessions
    /// are deleted in the same transaction.
    fn update_password(
        &self,
        domain_id: DomainId,
        username: &str,
        passwd_hash: &str,
        evict_sessions: bool,
    ) -> Result<()>;
    fn set_user_roles(&self, domain_id: DomainId, username: &str, roles: RoleFlags) -> Result<()>;
    /// Sets the ban flag. Banning also deletes every session of the user in
    /// the same transaction. Returns the number of sessions deleted.
    fn set_user_banned(&self, domain_id: DomainId, username: &str, banned: bool) -> Result<usize>;
    fn delete_user(&self, domain_id: DomainId, username: &str) -> Result<bool>;

    // Session operations
    fn create_session(&self, domain_id: DomainId, user_id: UserId, token: &str) -> Result<Session>;
    fn resolve_session(&self, domain_id: DomainId, token: &str) -> Result<Option<ResolvedSession>>;
    fn delete_session(&self, domain_id: DomainId, token: &str) -> Result<bool>;
    fn delete_user_sessions(&self, domain_id: DomainId, user_id: UserId) -> Result<usize>;
    fn delete_domain_sessions(&self, domain_id: DomainId) -> Result<usize>;
    fn delete_all_sessions(&self) -> Result<usize>;

    fn stats(&self, domain_id: DomainId) -> Result<ForumStats>;

    fn close(&self) -> Result<()>;
}
