use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::adapters::content::json_content_store::JsonContentStore;
use crate::adapters::directory::file_user_directory::FileUserDirectory;
use crate::adapters::ledger::json_audit_ledger::JsonAuditLedger;
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::models::actor::Actor;
use crate::core::services::alias_registry::AliasRegistry;
use crate::core::services::request_mediator::RequestMediator;
use crate::core::traits::user_directory::UserDirectory;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global data directory path.
/// If `custom` is provided, uses that path; otherwise defaults to `.staffalias`.
pub fn init(custom: Option<&str>) {
    let dir = custom
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".staffalias"));
    let _ = DATA_DIR.set(dir);
}

/// Get the current data directory path.
pub fn data_dir() -> &'static Path {
    DATA_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(".staffalias"))
}

/// Reject anything but a bare file name, so config values cannot escape
/// the data directory.
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(StaffAliasError::InvalidConfig {
            detail: format!("Invalid {what} '{name}': expected a plain file name"),
        });
    }
    Ok(())
}

pub type FileMediator = RequestMediator<FileUserDirectory, JsonContentStore, JsonAuditLedger>;

/// Loaded configuration plus the wired-up engine.
pub struct Workspace {
    pub config: AppConfig,
    pub mediator: FileMediator,
}

impl Workspace {
    /// Load `config.toml` and build the file-backed collaborators.
    pub fn open() -> Result<Self> {
        let dir = data_dir();
        if !dir.exists() {
            return Err(StaffAliasError::InvalidConfig {
                detail: format!("{} not found. Run 'staffalias init' first.", dir.display()),
            });
        }

        let config = AppConfig::load(dir)?;
        let mediator = RequestMediator {
            registry: AliasRegistry::new(config.alias.clone()),
            directory: FileUserDirectory::new(dir.join(&config.content.users_file)),
            content: JsonContentStore::new(
                dir.join(&config.content.data_file),
                config.content.min_raw_length,
            ),
            ledger: JsonAuditLedger::from_config(dir, &config.audit),
        };

        Ok(Self { config, mediator })
    }

    /// Look up the acting user by name.
    pub fn actor(&self, username: &str) -> Result<Actor> {
        self.mediator
            .directory
            .find_by_username(username)?
            .ok_or_else(|| StaffAliasError::UserNotFound {
                username: username.to_string(),
            })
    }

    /// Username for an id, or `#id` for users that no longer exist.
    pub fn display_user(&self, id: u64) -> String {
        match self.mediator.directory.find_by_id(id) {
            Ok(Some(user)) => user.username,
            _ => format!("#{id}"),
        }
    }
}
