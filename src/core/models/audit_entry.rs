use serde::{Deserialize, Serialize};

/// Kinds of aliased operation recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Update,
}

impl ActionKind {
    /// Stable code stored in the ledger and accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Update => "update",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "create" => Ok(ActionKind::Create),
            "update" => Ok(ActionKind::Update),
            other => Err(format!("unknown action '{other}' (expected create or update)")),
        }
    }
}

/// A single, immutable ledger row (JSON lines format).
///
/// `prev_hash` and `hash` chain every entry to the one before it, so an
/// edited or removed line is detectable by re-walking the file. Entries
/// cut from the end are caught by comparing the walk with the ledger's
/// recorded head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub seq: u64,
    pub real_actor_id: u64,
    pub content_id: u64,
    pub action: ActionKind,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub prev_hash: String,
    pub hash: String,
}
