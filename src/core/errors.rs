use crate::core::models::decision::DenyReason;

/// All domain errors for staffalias.
///
/// Each variant carries enough context for a caller (or a test) to tell
/// the exact cause apart, not just that something failed.
#[derive(Debug, thiserror::Error)]
pub enum StaffAliasError {
    #[error(
        "Alias account '{username}' is not configured\n\n  \
         No user with that name exists in the user directory.\n\n  \
         Solutions:\n    \
         → Create it: staffalias users add {username}\n    \
         → Or point [alias] username in config.toml at an existing user"
    )]
    AliasNotConfigured { username: String },

    #[error("Forbidden ({}): {reason}", .reason.http_status())]
    Forbidden { reason: DenyReason },

    #[error("Validation failed: {detail}")]
    ValidationFailed { detail: String },

    #[error(
        "Edit conflict on post {id}: expected revision {expected}, found {actual}\n\n  \
         Someone else edited this post in the meantime.\n  \
         Run 'staffalias show {id}' and retry against the latest revision."
    )]
    EditConflict { id: u64, expected: u32, actual: u32 },

    #[error("Post {id} not found")]
    ContentNotFound { id: u64 },

    #[error(
        "User '{username}' not found\n\n  \
         Run 'staffalias users list' to see known users."
    )]
    UserNotFound { username: String },

    #[error("User '{username}' already exists")]
    UserAlreadyExists { username: String },

    #[error(
        "Invalid username '{username}'\n\n  \
         Usernames are 1-60 characters of letters, digits, '_', '.' or '-'."
    )]
    InvalidUsername { username: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "This data directory uses format version {project_version}, but this build \
         only supports up to version {supported_version}."
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error("Audit ledger error: {detail}")]
    AuditError { detail: String },

    #[error(
        "Audit ledger tampered at line {line}: {detail}\n\n  \
         The hash chain no longer matches the recorded entries.\n  \
         Restore audit.log from a trusted backup before relying on it."
    )]
    LedgerTampered { line: usize, detail: String },

    #[error("Content store error: {detail}")]
    StoreError { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StaffAliasError>;
