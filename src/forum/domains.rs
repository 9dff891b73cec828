use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ConfigEntry, Domain, DomainFlag, DomainId, ForumStats};
use crate::validation::{validate_config, validate_domain_name, validate_forum_name};

/// Tenant registry. Domains are always resolved by their exact `domain_name`.
pub struct Domains<'a> {
    store: &'a dyn Store,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Creates a domain. Uniqueness is enforced by the store's constraint, so
    /// two racing creates yield exactly one row and one `DuplicateDomain`.
    pub fn create(&self, domain_name: &str, forum_name: &str) -> Result<DomainId> {
        validate_domain_name(domain_name).map_err(Error::InvalidName)?;
        validate_forum_name(forum_name).map_err(Error::InvalidName)?;
        self.store.create_domain(domain_name, forum_name.trim())
    }

    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        validate_domain_name(new_name).map_err(Error::InvalidName)?;
        self.store.rename_domain(old_name, new_name)
    }

    pub fn get(&self, domain_name: &str) -> Result<Domain> {
        self.store
            .get_domain_by_name(domain_name)?
            .ok_or(Error::NotFound("domain"))
    }

    pub fn get_by_id(&self, id: DomainId) -> Result<Domain> {
        self.store.get_domain(id)?.ok_or(Error::NotFound("domain"))
    }

    pub fn list(&self) -> Result<Vec<Domain>> {
        self.store.list_domains()
    }

    pub fn set_read_only(&self, domain_name: &str, read_only: bool) -> Result<()> {
        self.store
            .set_domain_flag(domain_name, DomainFlag::ReadOnly, read_only)
    }

    pub fn set_signup_disabled(&self, domain_name: &str, disabled: bool) -> Result<()> {
        self.store
            .set_domain_flag(domain_name, DomainFlag::SignupDisabled, disabled)
    }

    pub fn set_forum_name(&self, domain_name: &str, forum_name: &str) -> Result<()> {
        validate_forum_name(forum_name).map_err(Error::InvalidName)?;
        self.store.set_forum_name(domain_name, forum_name.trim())
    }

    /// Deletes a domain together with everything it owns.
    pub fn delete(&self, domain_name: &str) -> Result<()> {
        if self.store.delete_domain(domain_name)? {
            Ok(())
        } else {
            Err(Error::NotFound("domain"))
        }
    }

    pub fn get_config(&self, domain_name: &str, key: &str) -> Result<Option<String>> {
        let domain = self.get(domain_name)?;
        self.store.get_config(domain.id, key)
    }

    pub fn set_config(&self, domain_name: &str, key: &str, value: &str) -> Result<()> {
        validate_config(key, value).map_err(Error::InvalidName)?;
        let domain = self.get(domain_name)?;
        self.store.set_config(domain.id, key, value)
    }

    pub fn list_config(&self, domain_name: &str) -> Result<Vec<ConfigEntry>> {
        let domain = self.get(domain_name)?;
        self.store.list_config(domain.id)
    }

    pub fn stats(&self, domain_name: &str) -> Result<ForumStats> {
        let domain = self.get(domain_name)?;
        self.store.stats(domain.id)
    }
}
