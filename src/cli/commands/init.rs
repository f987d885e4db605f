use crate::adapters::content::json_content_store::JsonContentStore;
use crate::adapters::directory::file_user_directory::FileUserDirectory;
use crate::cli::context;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::models::actor::Actor;

/// Execute the `staffalias init` command.
///
/// Creates the data directory with `config.toml`, an empty users file and
/// an empty content store. The alias account itself is not created.
pub fn execute(alias_username: &str, enable: bool, verbose: bool) -> Result<()> {
    let dir = context::data_dir();

    if dir.exists() {
        return Err(StaffAliasError::InvalidConfig {
            detail: format!("Already initialized ({} exists)", dir.display()),
        });
    }
    Actor::validate_username(alias_username)?;

    output::header("staffalias: initializing");

    std::fs::create_dir_all(dir)?;
    output::success(&format!("Created {}/", dir.display()));

    let config = AppConfig::initial(alias_username, enable);
    std::fs::write(dir.join("config.toml"), config.to_toml()?)?;
    output::success("Generated config.toml");

    FileUserDirectory::new(dir.join(&config.content.users_file)).initialize()?;
    JsonContentStore::new(
        dir.join(&config.content.data_file),
        config.content.min_raw_length,
    )
    .initialize()?;

    if enable {
        output::success(&format!("Alias posting enabled as '{alias_username}'"));
    } else {
        output::warning("Alias posting is disabled (set [alias] enabled = true to turn it on)");
    }

    println!("\n  Next steps:");
    println!("    staffalias users add {alias_username}");
    println!("    staffalias users add <moderator> --staff");
    if verbose {
        println!("    staffalias post --actor <moderator> --raw \"...\" --as-alias");
        println!("    staffalias log");
    }

    Ok(())
}
