//! Caller roles and the capability check used for authorization.
//!
//! Role names on the wire (token claims, JSON) are lowercase: `user`,
//! `poweruser`, `admin`, `owner`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_MEMBER: &str = "user";
pub const ROLE_POWER_USER: &str = "poweruser";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OWNER: &str = "owner";

/// Closed set of roles a caller can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(rename = "user")]
    Member,
    #[serde(rename = "poweruser")]
    PowerUser,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => ROLE_MEMBER,
            Role::PowerUser => ROLE_POWER_USER,
            Role::Admin => ROLE_ADMIN,
            Role::Owner => ROLE_OWNER,
        }
    }

    /// Whether a caller holding `self` satisfies a `required` role.
    ///
    /// Roles are not ordered: only an exact match passes, so an `owner`
    /// does not satisfy `admin`.
    pub fn has_role(self, required: Role) -> bool {
        self == required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_MEMBER => Ok(Role::Member),
            ROLE_POWER_USER => Ok(Role::PowerUser),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_OWNER => Ok(Role::Owner),
            other => Err(CoreError::Unauthorized(format!("Unknown role '{other}'"))),
        }
    }
}
