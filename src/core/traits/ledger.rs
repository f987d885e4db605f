use crate::core::errors::Result;
use crate::core::models::audit_entry::{ActionKind, AuditEntry};

/// Entries read on demand, oldest first. Read or integrity errors surface
/// as items, at the entry where they occur.
pub type Entries<'a> = Box<dyn Iterator<Item = Result<AuditEntry>> + 'a>;

/// Port for the append-only attribution ledger.
pub trait AuditLedger: Send + Sync {
    /// Append one entry. Callers must only do this after the content
    /// mutation it describes has committed.
    fn record(
        &self,
        real_actor_id: u64,
        content_id: u64,
        action: ActionKind,
    ) -> Result<AuditEntry>;

    fn exists(&self, real_actor_id: u64, content_id: u64, action: ActionKind) -> Result<bool>;

    /// Every entry for a post. Lazy: entries are read as the iterator is
    /// advanced.
    fn entries_for(&self, content_id: u64) -> Result<Entries<'_>>;

    /// Every entry made by one real actor. Lazy, like `entries_for`.
    fn entries_by_actor(&self, real_actor_id: u64) -> Result<Entries<'_>>;

    /// Re-walk the hash chain and return the number of intact entries.
    fn verify(&self) -> Result<usize>;
}
