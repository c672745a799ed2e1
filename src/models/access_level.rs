use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AuthzError;

/// Grant strength attached to a permission tree leaf.
///
/// Variant order is the merge precedence: a later variant always wins over an
/// earlier one when two roles grant the same thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    NoAccess,
    ViewAccess,
    WriteAccess,
    AdminAccess,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 4] = [
        AccessLevel::NoAccess,
        AccessLevel::ViewAccess,
        AccessLevel::WriteAccess,
        AccessLevel::AdminAccess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::NoAccess => "no_access",
            AccessLevel::ViewAccess => "view_access",
            AccessLevel::WriteAccess => "write_access",
            AccessLevel::AdminAccess => "admin_access",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_access" => Ok(AccessLevel::NoAccess),
            "view_access" => Ok(AccessLevel::ViewAccess),
            "write_access" => Ok(AccessLevel::WriteAccess),
            "admin_access" => Ok(AccessLevel::AdminAccess),
            other => Err(AuthzError::unknown_access_level("", other)),
        }
    }
}
