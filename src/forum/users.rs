use crate::auth::PasswordHasher;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{DomainId, NewUser, RoleFlags, User, UserId};
use crate::validation::{validate_email, validate_username};

/// Identity registry: per-domain accounts and their credentials.
pub struct Users<'a> {
    store: &'a dyn Store,
    hasher: &'a PasswordHasher,
}

impl<'a> Users<'a> {
    pub(crate) fn new(store: &'a dyn Store, hasher: &'a PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub fn create(
        &self,
        domain_id: DomainId,
        username: &str,
        password: &str,
        roles: RoleFlags,
    ) -> Result<UserId> {
        self.create_with_email(domain_id, username, password, roles, None)
    }

    pub fn create_with_email(
        &self,
        domain_id: DomainId,
        username: &str,
        password: &str,
        roles: RoleFlags,
        email: Option<&str>,
    ) -> Result<UserId> {
        if password.trim().is_empty() {
            return Err(Error::EmptyPassword);
        }
        validate_username(username).map_err(Error::InvalidName)?;
        if let Some(email) = email {
            validate_email(email).map_err(Error::InvalidName)?;
        }

        let passwd_hash = self.hasher.hash(password)?;
        self.store.create_user(&NewUser {
            domain_id,
            username: username.to_string(),
            passwd_hash,
            email: email.map(str::to_string),
            roles,
        })
    }

    /// Replaces the password. Existing sessions stay valid; see
    /// [`Users::change_password_and_evict_sessions`] to also log the user out.
    pub fn change_password(&self, domain_id: DomainId, username: &str, new_password: &str) -> Result<()> {
        let passwd_hash = self.hasher.hash(new_password)?;
        self.store
            .update_password(domain_id, username, &passwd_hash, false)
    }

    /// Replaces the password and deletes every session of the user atomically.
    pub fn change_password_and_evict_sessions(
        &self,
        domain_id: DomainId,
        username: &str,
        new_password: &str,
    ) -> Result<()> {
        let passwd_hash = self.hasher.hash(new_password)?;
        self.store
            .update_password(domain_id, username, &passwd_hash, true)
    }

    /// Checks a username/password pair within one domain.
    ///
    /// An unknown username and a wrong password both yield `BadCredentials`,
    /// after the same amount of hashing work. A correct password on a banned
    /// account yields `UserBanned`.
    pub fn verify_credentials(&self, domain_id: DomainId, username: &str, password: &str) -> Result<UserId> {
        let Some(user) = self.store.get_user_by_username(domain_id, username)? else {
            self.hasher.verify_dummy(password);
            return Err(Error::BadCredentials);
        };

        if !self.hasher.verify(password, &user.passwd_hash)? {
            return Err(Error::BadCredentials);
        }
        if user.is_banned {
            return Err(Error::UserBanned);
        }
        Ok(user.id)
    }

    /// Sets the ban flag; banning deletes the user's sessions in the same
    /// transaction. Returns the number of sessions deleted.
    pub fn set_banned(&self, domain_id: DomainId, username: &str, banned: bool) -> Result<usize> {
        self.store.set_user_banned(domain_id, username, banned)
    }

    pub fn set_roles(&self, domain_id: DomainId, username: &str, roles: RoleFlags) -> Result<()> {
        self.store.set_user_roles(domain_id, username, roles)
    }

    pub fn get(&self, domain_id: DomainId, username: &str) -> Result<User> {
        self.store
            .get_user_by_username(domain_id, username)?
            .ok_or(Error::NotFound("user"))
    }

    pub fn get_by_id(&self, domain_id: DomainId, id: UserId) -> Result<User> {
        self.store
            .get_user(domain_id, id)?
            .ok_or(Error::NotFound("user"))
    }

    pub fn list(&self, domain_id: DomainId) -> Result<Vec<User>> {
        self.store.list_users(domain_id)
    }

    pub fn delete(&self, domain_id: DomainId, username: &str) -> Result<()> {
        if self.store.delete_user(domain_id, username)? {
            Ok(())
        } else {
            Err(Error::NotFound("user"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::forum::{Forum, SessionPolicy};
    use crate::store::{SqliteStore, Store};

    use super::*;

    fn setup() -> (TempDir, Forum, DomainId) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.migrate_to_latest().unwrap();
        let forum = Forum::open(Arc::new(store), SessionPolicy::default()).unwrap();
        let domain_id = forum.domains().create("a.example", "A").unwrap();
        (temp, forum, domain_id)
    }

    #[test]
    fn test_create_and_verify() {
        let (_temp, forum, d) = setup();
        let id = forum.users().create(d, "alice", "pw1", RoleFlags::USER).unwrap();

        assert_eq!(forum.users().verify_credentials(d, "alice", "pw1").unwrap(), id);
        assert!(matches!(
            forum.users().verify_credentials(d, "alice", "wrong"),
            Err(Error::BadCredentials)
        ));
    }

    #[test]
    fn test_unknown_user_looks_like_bad_password() {
        let (_temp, forum, d) = setup();
        assert!(matches!(
            forum.users().verify_credentials(d, "nobody", "pw"),
            Err(Error::BadCredentials)
        ));
    }

    #[test]
    fn test_password_is_not_stored() {
        let (_temp, forum, d) = setup();
        forum.users().create(d, "alice", "s3cret", RoleFlags::USER).unwrap();

        let user = forum.users().get(d, "alice").unwrap();
        assert!(user.passwd_hash.starts_with("$argon2id$"));
        assert!(!user.passwd_hash.contains("s3cret"));
    }

    #[test]
    fn test_empty_password_rejected() {
        let (_temp, forum, d) = setup();
        assert!(matches!(
            forum.users().create(d, "alice", "", RoleFlags::USER),
            Err(Error::EmptyPassword)
        ));

        forum.users().create(d, "alice", "pw", RoleFlags::USER).unwrap();
        assert!(matches!(
            forum.users().change_password(d, "alice", "  "),
            Err(Error::EmptyPassword)
        ));
    }

    #[test]
    fn test_duplicate_user() {
        let (_temp, forum, d) = setup();
        forum.users().create(d, "alice", "pw", RoleFlags::USER).unwrap();
        assert!(matches!(
            forum.users().create(d, "alice", "pw2", RoleFlags::ADMIN),
            Err(Error::DuplicateUser(_))
        ));
    }

    #[test]
    fn test_change_password() {
        let (_temp, forum, d) = setup();
        forum.users().create(d, "alice", "old", RoleFlags::USER).unwrap();

        forum.users().change_password(d, "alice", "new").unwrap();
        assert!(forum.users().verify_credentials(d, "alice", "new").is_ok());
        assert!(matches!(
            forum.users().verify_credentials(d, "alice", "old"),
            Err(Error::BadCredentials)
        ));

        assert!(matches!(
            forum.users().change_password(d, "bob", "x"),
            Err(Error::NotFound("user"))
        ));
    }

    #[test]
    fn test_banned_user_cannot_verify() {
        let (_temp, forum, d) = setup();
        forum.users().create(d, "alice", "pw", RoleFlags::USER).unwrap();
        forum.users().set_banned(d, "alice", true).unwrap();

        assert!(matches!(
            forum.users().verify_credentials(d, "alice", "pw"),
            Err(Error::UserBanned)
        ));
        assert!(matches!(
            forum.users().verify_credentials(d, "alice", "wrong"),
            Err(Error::BadCredentials)
        ));

        forum.users().set_banned(d, "alice", false).unwrap();
        assert!(forum.users().verify_credentials(d, "alice", "pw").is_ok());
    }

    #[test]
    fn test_roles() {
        let (_temp, forum, d) = setup();
        forum.users().create(d, "alice", "pw", RoleFlags::ADMIN).unwrap();
        assert_eq!(forum.users().get(d, "alice").unwrap().roles(), RoleFlags::ADMIN);

        forum.users().set_roles(d, "alice", RoleFlags::MODERATOR).unwrap();
        let user = forum.users().get(d, "alice").unwrap();
        assert!(!user.is_admin);
        assert!(user.is_mod);
    }

    #[test]
    fn test_email_validation() {
        let (_temp, forum, d) = setup();
        assert!(matches!(
            forum
                .users()
                .create_with_email(d, "alice", "pw", RoleFlags::USER, Some("nope")),
            Err(Error::InvalidName(_))
        ));
        forum
            .users()
            .create_with_email(d, "alice", "pw", RoleFlags::USER, Some("alice@a.example"))
            .unwrap();
        assert_eq!(
            forum.users().get(d, "alice").unwrap().email.as_deref(),
            Some("alice@a.example")
        );
    }
}
