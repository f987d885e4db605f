use crate::core::errors::Result;
use crate::core::models::actor::Actor;

/// Port for the site's user directory.
///
/// The engine only reads from it; `add` and `remove` exist for the
/// command line and for tests that need to rename or delete accounts.
pub trait UserDirectory: Send + Sync {
    fn find_by_id(&self, id: u64) -> Result<Option<Actor>>;

    /// Case-insensitive lookup.
    fn find_by_username(&self, username: &str) -> Result<Option<Actor>>;

    /// Register a new user and return it with its assigned id.
    fn add(&self, username: &str, staff: bool) -> Result<Actor>;

    fn remove(&self, username: &str) -> Result<()>;

    fn list(&self) -> Result<Vec<Actor>>;
}
