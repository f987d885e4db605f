use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::config::app_config::AliasSettings;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::models::alias_identity::AliasIdentity;
use crate::core::traits::user_directory::UserDirectory;

/// Resolves the one configured alias account and remembers it.
///
/// The cache is read-mostly and refreshed racily: two threads resolving
/// the same username end up storing the same identity. A cached identity
/// is re-checked against the directory on every read, so a deleted or
/// renamed alias account is noticed instead of served stale.
pub struct AliasRegistry {
    settings: RwLock<AliasSettings>,
    cached: RwLock<Option<AliasIdentity>>,
    warned_unconfigured: AtomicBool,
}

impl AliasRegistry {
    pub fn new(settings: AliasSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            cached: RwLock::new(None),
            warned_unconfigured: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> AliasSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in new settings and forget the cached identity.
    pub fn reconfigure(&self, settings: AliasSettings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
        self.clear_cache();
        self.warned_unconfigured.store(false, Ordering::Relaxed);
    }

    /// True iff the feature toggle is on and an alias username is set.
    pub fn is_enabled(&self) -> bool {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        settings.enabled && !settings.username.trim().is_empty()
    }

    /// Look the configured alias username up in the user directory.
    ///
    /// Fails with `AliasNotConfigured` when the name is empty or no such
    /// user exists.
    pub fn resolve_identity<D: UserDirectory + ?Sized>(
        &self,
        directory: &D,
    ) -> Result<AliasIdentity> {
        let username = self.settings().username.trim().to_string();
        if username.is_empty() {
            self.clear_cache();
            return Err(StaffAliasError::AliasNotConfigured { username });
        }

        let cached = self
            .cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(identity) = cached
            && identity.username.eq_ignore_ascii_case(&username)
            && let Some(user) = directory.find_by_id(identity.id)?
            && user.username.eq_ignore_ascii_case(&username)
        {
            return Ok(identity);
        }

        match directory.find_by_username(&username)? {
            Some(user) => {
                let identity = AliasIdentity {
                    id: user.id,
                    username: user.username,
                };
                tracing::debug!(alias = %identity, "resolved alias identity");
                *self.cached.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(identity.clone());
                Ok(identity)
            }
            None => {
                self.clear_cache();
                Err(StaffAliasError::AliasNotConfigured { username })
            }
        }
    }

    /// The alias identity if aliasing can happen right now.
    ///
    /// A missing alias account counts as "disabled"; it is logged once as
    /// an operational warning rather than surfaced to the user. Directory
    /// I/O failures still propagate.
    pub fn available_identity<D: UserDirectory + ?Sized>(
        &self,
        directory: &D,
    ) -> Result<Option<AliasIdentity>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        match self.resolve_identity(directory) {
            Ok(identity) => Ok(Some(identity)),
            Err(StaffAliasError::AliasNotConfigured { username }) => {
                if !self.warned_unconfigured.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        %username,
                        "alias posting is enabled but the alias account does not exist; treating the feature as disabled"
                    );
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn clear_cache(&self) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::directory::file_user_directory::FileUserDirectory;
    use tempfile::TempDir;

    fn settings(enabled: bool, username: &str) -> AliasSettings {
        AliasSettings {
            enabled,
            username: username.to_string(),
        }
    }

    fn directory_with_alias(tmp: &TempDir) -> FileUserDirectory {
        let directory = FileUserDirectory::new(tmp.path().join("users.toml"));
        directory.add("moderator", true).unwrap();
        directory.add("some_alias", false).unwrap();
        directory
    }

    #[test]
    fn enabled_needs_toggle_and_username() {
        assert!(AliasRegistry::new(settings(true, "some_alias")).is_enabled());
        assert!(!AliasRegistry::new(settings(false, "some_alias")).is_enabled());
        assert!(!AliasRegistry::new(settings(true, "")).is_enabled());
        assert!(!AliasRegistry::new(settings(true, "   ")).is_enabled());
    }

    #[test]
    fn resolving_twice_returns_the_same_identity() {
        let tmp = TempDir::new().unwrap();
        let directory = directory_with_alias(&tmp);
        let registry = AliasRegistry::new(settings(true, "some_alias"));

        let first = registry.resolve_identity(&directory).unwrap();
        let second = registry.resolve_identity(&directory).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.username, "some_alias");
    }

    #[test]
    fn missing_alias_user_is_not_configured() {
        let tmp = TempDir::new().unwrap();
        let directory = FileUserDirectory::new(tmp.path().join("users.toml"));
        let registry = AliasRegistry::new(settings(true, "some_alias"));

        let result = registry.resolve_identity(&directory);
        assert!(matches!(
            result,
            Err(StaffAliasError::AliasNotConfigured { username }) if username == "some_alias"
        ));
    }

    #[test]
    fn deleted_alias_user_is_noticed_after_caching() {
        let tmp = TempDir::new().unwrap();
        let directory = directory_with_alias(&tmp);
        let registry = AliasRegistry::new(settings(true, "some_alias"));
        registry.resolve_identity(&directory).unwrap();

        directory.remove("some_alias").unwrap();

        assert!(registry.resolve_identity(&directory).is_err());
        assert_eq!(registry.available_identity(&directory).unwrap(), None);
    }

    #[test]
    fn recreated_alias_user_is_re_resolved() {
        let tmp = TempDir::new().unwrap();
        let directory = directory_with_alias(&tmp);
        let registry = AliasRegistry::new(settings(true, "some_alias"));
        let old = registry.resolve_identity(&directory).unwrap();

        directory.remove("some_alias").unwrap();
        let recreated = directory.add("some_alias", false).unwrap();

        let resolved = registry.resolve_identity(&directory).unwrap();
        assert_ne!(resolved.id, old.id);
        assert_eq!(resolved.id, recreated.id);
    }

    #[test]
    fn reconfigure_switches_to_the_new_alias() {
        let tmp = TempDir::new().unwrap();
        let directory = directory_with_alias(&tmp);
        let team = directory.add("the_team", false).unwrap();
        let registry = AliasRegistry::new(settings(true, "some_alias"));
        registry.resolve_identity(&directory).unwrap();

        registry.reconfigure(settings(true, "the_team"));

        assert_eq!(registry.resolve_identity(&directory).unwrap().id, team.id);
    }

    #[test]
    fn disabled_feature_has_no_available_identity() {
        let tmp = TempDir::new().unwrap();
        let directory = directory_with_alias(&tmp);
        let registry = AliasRegistry::new(settings(false, "some_alias"));

        assert_eq!(registry.available_identity(&directory).unwrap(), None);
    }
}
