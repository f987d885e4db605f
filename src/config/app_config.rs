use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::errors::{Result, StaffAliasError};

/// Top-level configuration read from `<dir>/config.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub staffalias: MetaSection,
    #[serde(default)]
    pub alias: AliasSettings,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub content: ContentSection,
}

impl AppConfig {
    /// Load the configuration from `<dir>/config.toml`.
    ///
    /// After parsing, validates every configured file name so a tampered
    /// config cannot point the stores outside the data directory.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            return Err(StaffAliasError::InvalidConfig {
                detail: "config.toml not found. Run 'staffalias init' first.".into(),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::parse(&content)?;

        crate::cli::context::validate_simple_filename(&config.audit.log_file, "audit log file")?;
        crate::cli::context::validate_simple_filename(&config.content.data_file, "content data file")?;
        crate::cli::context::validate_simple_filename(&config.content.users_file, "users file")?;

        Ok(config)
    }

    /// Parse and version-check a config document.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| StaffAliasError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.staffalias.format_version > CURRENT_FORMAT_VERSION {
            return Err(StaffAliasError::FormatVersionTooNew {
                project_version: config.staffalias.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// A fresh configuration as written by `staffalias init`.
    pub fn initial(alias_username: &str, enabled: bool) -> Self {
        Self {
            staffalias: MetaSection {
                version: env!("CARGO_PKG_VERSION").to_string(),
                format_version: CURRENT_FORMAT_VERSION,
            },
            alias: AliasSettings {
                enabled,
                username: alias_username.to_string(),
            },
            audit: AuditSection::default(),
            content: ContentSection::default(),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StaffAliasError::InvalidConfig {
            detail: format!("Failed to serialize config.toml: {e}"),
        })
    }
}

/// Current format version supported by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// The `[staffalias]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetaSection {
    pub version: String,
    /// Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

fn default_format_version() -> u32 {
    1
}

/// The `[alias]` section: the site-wide toggle and the alias account name.
///
/// An empty `username` means "unconfigured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AliasSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub username: String,
}

/// The `[audit]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditSection {
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

fn default_log_file() -> String {
    "audit.log".into()
}

/// The `[content]` section, used by the bundled file-backed stores.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentSection {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    /// Minimum length of a post body after trimming.
    #[serde(default = "default_min_raw_length")]
    pub min_raw_length: usize,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            users_file: default_users_file(),
            min_raw_length: default_min_raw_length(),
        }
    }
}

fn default_data_file() -> String {
    "posts.json".into()
}

fn default_users_file() -> String {
    "users.toml".into()
}

fn default_min_raw_length() -> usize {
    1
}
