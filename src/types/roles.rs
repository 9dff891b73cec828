use std::fmt;

use serde::{Deserialize, Serialize};

/// Role flags carried on a user row. Admin and moderator are independent
/// booleans rather than separate entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_mod: bool,
}

impl RoleFlags {
    pub const USER: RoleFlags = RoleFlags {
        is_admin: false,
        is_mod: false,
    };
    pub const MODERATOR: RoleFlags = RoleFlags {
        is_admin: false,
        is_mod: true,
    };
    pub const ADMIN: RoleFlags = RoleFlags {
        is_admin: true,
        is_mod: false,
    };

    /// Converts a role name to its flags.
    pub fn parse(s: &str) -> Option<RoleFlags> {
        match s {
            "user" => Some(Self::USER),
            "mod" | "moderator" => Some(Self::MODERATOR),
            "admin" => Some(Self::ADMIN),
            _ => None,
        }
    }

    /// Combines two sets of flags.
    #[must_use]
    pub const fn union(self, other: RoleFlags) -> RoleFlags {
        RoleFlags {
            is_admin: self.is_admin || other.is_admin,
            is_mod: self.is_mod || other.is_mod,
        }
    }

    /// Converts a comma-separated role list (e.g. "admin,mod") to flags.
    pub fn parse_many(s: &str) -> Option<RoleFlags> {
        s.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .try_fold(Self::USER, |acc, r| Some(acc.union(Self::parse(r)?)))
    }

    #[must_use]
    pub fn to_strings(self) -> Vec<&'static str> {
        let mut roles = Vec::new();
        if self.is_admin {
            roles.push("admin");
        }
        if self.is_mod {
            roles.push("mod");
        }
        if roles.is_empty() {
            roles.push("user");
        }
        roles
    }
}

impl fmt::Display for RoleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_strings().join(", "))
    }
}
