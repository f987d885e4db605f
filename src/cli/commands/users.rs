use colored::Colorize;

use crate::cli::UsersAction;
use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::traits::user_directory::UserDirectory;

/// Execute the `staffalias users` command.
pub fn execute(action: &UsersAction) -> Result<()> {
    let workspace = Workspace::open()?;
    let directory = &workspace.mediator.directory;

    match action {
        UsersAction::Add { username, staff } => {
            let user = directory.add(username, *staff)?;
            output::success(&format!("Added {user}"));
        }
        UsersAction::List => {
            let users = directory.list()?;
            let alias = workspace.config.alias.username.as_str();
            output::header(&format!("Users ({})", users.len()));
            for user in users {
                let marker = if !alias.is_empty() && user.username.eq_ignore_ascii_case(alias) {
                    " [alias]".cyan().to_string()
                } else {
                    String::new()
                };
                println!("  {user}{marker}");
            }
        }
        UsersAction::Remove { username } => {
            directory.remove(username)?;
            output::success(&format!("Removed {username}"));
        }
    }

    Ok(())
}
