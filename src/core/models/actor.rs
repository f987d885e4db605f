use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, StaffAliasError};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]{1,60}$").expect("static regex is valid"));

/// A real, authenticated user as known to the user directory.
///
/// The alias account is stored the same way; what makes it the alias is
/// only the `[alias] username` setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: u64,
    pub username: String,
    /// Moderator or admin.
    #[serde(default)]
    pub staff: bool,
}

impl Actor {
    /// Reject usernames the directory would not accept.
    pub fn validate_username(username: &str) -> Result<()> {
        if USERNAME_RE.is_match(username) {
            Ok(())
        } else {
            Err(StaffAliasError::InvalidUsername {
                username: username.to_string(),
            })
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.staff {
            write!(f, "{} (#{}, staff)", self.username, self.id)
        } else {
            write!(f, "{} (#{})", self.username, self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_usernames() {
        assert!(Actor::validate_username("staff_alias").is_ok());
        assert!(Actor::validate_username("mod.jane-2").is_ok());
    }

    #[test]
    fn rejects_empty_or_odd_usernames() {
        assert!(Actor::validate_username("").is_err());
        assert!(Actor::validate_username("has space").is_err());
        assert!(Actor::validate_username("../etc").is_err());
        assert!(Actor::validate_username(&"x".repeat(61)).is_err());
    }
}
