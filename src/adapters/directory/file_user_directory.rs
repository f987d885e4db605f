use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::adapters::file_io;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::models::actor::Actor;
use crate::core::traits::user_directory::UserDirectory;

/// User directory persisted as a TOML file.
///
/// Example `users.toml`:
/// ```text
/// next_id = 3
///
/// [[users]]
/// id = 1
/// username = "moderator"
/// staff = true
///
/// [[users]]
/// id = 2
/// username = "staff_alias"
/// staff = false
/// ```
///
/// Reads and writes share one lock per file and saves replace the file
/// atomically, as in `JsonContentStore`.
pub struct FileUserDirectory {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    users: Vec<Actor>,
}

impl FileUserDirectory {
    pub fn new(path: PathBuf) -> Self {
        Self {
            lock: file_io::lock_for(&path),
            path,
        }
    }

    /// Write an empty users file if none exists yet.
    pub fn initialize(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() {
            return Ok(());
        }
        self.save(&UsersFile::default())
    }

    fn load_locked(&self) -> Result<UsersFile> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    fn load(&self) -> Result<UsersFile> {
        if !self.path.exists() {
            return Ok(UsersFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| StaffAliasError::StoreError {
            detail: format!("Malformed users file {}: {e}", self.path.display()),
        })
    }

    fn save(&self, file: &UsersFile) -> Result<()> {
        let content = toml::to_string_pretty(file).map_err(|e| StaffAliasError::StoreError {
            detail: format!("Failed to serialize users: {e}"),
        })?;
        file_io::write_atomic(&self.path, content.as_bytes())
    }
}

impl UserDirectory for FileUserDirectory {
    fn find_by_id(&self, id: u64) -> Result<Option<Actor>> {
        Ok(self.load_locked()?.users.into_iter().find(|u| u.id == id))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Actor>> {
        Ok(self
            .load_locked()?
            .users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    fn add(&self, username: &str, staff: bool) -> Result<Actor> {
        Actor::validate_username(username)?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.load()?;

        if file
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(StaffAliasError::UserAlreadyExists {
                username: username.to_string(),
            });
        }

        // Ids are never reused, even after a user is removed.
        let highest = file.users.iter().map(|u| u.id).max().unwrap_or(0);
        let id = file.next_id.max(highest + 1);
        file.next_id = id + 1;

        let actor = Actor {
            id,
            username: username.to_string(),
            staff,
        };
        file.users.push(actor.clone());
        self.save(&file)?;
        Ok(actor)
    }

    fn remove(&self, username: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.load()?;

        let before = file.users.len();
        file.users.retain(|u| !u.username.eq_ignore_ascii_case(username));
        if file.users.len() == before {
            return Err(StaffAliasError::UserNotFound {
                username: username.to_string(),
            });
        }

        self.save(&file)
    }

    fn list(&self) -> Result<Vec<Actor>> {
        Ok(self.load_locked()?.users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn directory(tmp: &TempDir) -> FileUserDirectory {
        FileUserDirectory::new(tmp.path().join("users.toml"))
    }

    #[test]
    fn list_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(directory(&tmp).list().unwrap().is_empty());
    }

    #[test]
    fn add_assigns_increasing_ids() {
        let tmp = TempDir::new().unwrap();
        let dir = directory(&tmp);

        let a = dir.add("alice", false).unwrap();
        let b = dir.add("bob", true).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(b.staff);
        assert_eq!(dir.list().unwrap().len(), 2);
    }

    #[test]
    fn lookups_by_name_ignore_case() {
        let tmp = TempDir::new().unwrap();
        let dir = directory(&tmp);
        let added = dir.add("Moderator", true).unwrap();

        assert_eq!(dir.find_by_username("moderator").unwrap(), Some(added.clone()));
        assert_eq!(dir.find_by_id(added.id).unwrap(), Some(added));
        assert_eq!(dir.find_by_username("nobody").unwrap(), None);
    }

    #[test]
    fn duplicate_username_rejected() {
        let tmp = TempDir::new().unwrap();
        let dir = directory(&tmp);
        dir.add("alice", false).unwrap();

        let result = dir.add("ALICE", false);
        assert!(matches!(result, Err(StaffAliasError::UserAlreadyExists { .. })));
    }

    #[test]
    fn invalid_username_rejected() {
        let tmp = TempDir::new().unwrap();
        let result = directory(&tmp).add("not valid", false);
        assert!(matches!(result, Err(StaffAliasError::InvalidUsername { .. })));
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let tmp = TempDir::new().unwrap();
        let dir = directory(&tmp);
        dir.add("alice", false).unwrap();
        let bob = dir.add("bob", false).unwrap();

        dir.remove("bob").unwrap();
        let carol = dir.add("carol", false).unwrap();

        assert!(carol.id > bob.id);
        assert_eq!(dir.find_by_id(bob.id).unwrap(), None);
    }

    #[test]
    fn remove_unknown_user_fails() {
        let tmp = TempDir::new().unwrap();
        let result = directory(&tmp).remove("ghost");
        assert!(matches!(result, Err(StaffAliasError::UserNotFound { .. })));
    }

    #[test]
    fn initialize_creates_a_readable_empty_file() {
        let tmp = TempDir::new().unwrap();
        let dir = directory(&tmp);

        dir.initialize().unwrap();

        assert!(tmp.path().join("users.toml").exists());
        assert!(dir.list().unwrap().is_empty());
        assert_eq!(dir.add("alice", false).unwrap().id, 1);
    }

    #[test]
    fn two_handles_on_one_file_keep_every_user() {
        let tmp = TempDir::new().unwrap();
        let first = directory(&tmp);
        let second = directory(&tmp);

        std::thread::scope(|scope| {
            for (prefix, handle) in [("a", &first), ("b", &second)] {
                scope.spawn(move || {
                    for i in 0..25 {
                        handle.add(&format!("{prefix}{i}"), false).unwrap();
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..200 {
                    first.list().unwrap();
                }
            });
        });

        let mut ids: Vec<u64> = second.list().unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 50);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }
}
