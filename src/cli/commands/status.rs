use colored::Colorize;

use crate::cli::context::{self, Workspace};
use crate::cli::output;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::traits::content_engine::ContentEngine;
use crate::core::traits::ledger::AuditLedger;
use crate::core::traits::user_directory::UserDirectory;

/// Execute the `staffalias status` command.
///
/// Shows whether aliasing is usable right now and a summary of the data.
pub fn execute() -> Result<()> {
    let workspace = Workspace::open()?;
    let mediator = &workspace.mediator;
    let settings = &workspace.config.alias;

    output::header(&format!("staffalias v{}", env!("CARGO_PKG_VERSION")));
    println!("  Data: {}", context::data_dir().display());

    println!("\n{}", "  Alias".bold());
    if !settings.enabled {
        output::warning("Alias posting is disabled");
    } else if settings.username.trim().is_empty() {
        output::warning("Alias posting is enabled but no alias username is set");
    } else {
        match mediator.registry.resolve_identity(&mediator.directory) {
            Ok(identity) => output::success(&format!("Enabled, posting as {identity}")),
            Err(StaffAliasError::AliasNotConfigured { username }) => output::warning(&format!(
                "Enabled, but alias account '{username}' does not exist"
            )),
            Err(e) => return Err(e),
        }
    }

    println!("\n{}", "  Data".bold());
    let users = mediator.directory.list()?;
    let staff = users.iter().filter(|u| u.staff).count();
    println!("  Users: {} ({} staff)", users.len(), staff);

    let posts = mediator.content.list()?;
    let aliased = posts.iter().filter(|p| p.authored_as_alias).count();
    println!("  Posts: {} ({} by the alias)", posts.len(), aliased);

    match mediator.ledger.verify() {
        Ok(count) => println!("  Ledger: {count} entries, chain intact"),
        Err(e) => output::warning(&format!("Ledger: {e}")),
    }

    Ok(())
}
