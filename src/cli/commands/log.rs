use colored::Colorize;

use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::audit_entry::{ActionKind, AuditEntry};
use crate::core::traits::ledger::{AuditLedger, Entries};

/// Execute the `staffalias log` command.
///
/// Displays ledger entries with optional filters for post, real user,
/// and entry count.
pub fn execute(post: Option<u64>, actor: Option<&str>, last: Option<usize>) -> Result<()> {
    let workspace = Workspace::open()?;
    let ledger = &workspace.mediator.ledger;

    let actor_id = actor.map(|name| workspace.actor(name)).transpose()?.map(|a| a.id);

    let selected: Entries<'_> = match (post, actor_id) {
        (Some(post), _) => ledger.entries_for(post)?,
        (None, Some(actor_id)) => ledger.entries_by_actor(actor_id)?,
        (None, None) => Box::new(ledger.stream()?.map(|item| item.map(|(_, entry)| entry))),
    };
    let mut entries = selected
        .filter(|item| match (item, actor_id) {
            (Ok(entry), Some(actor_id)) => entry.real_actor_id == actor_id,
            _ => true,
        })
        .collect::<Result<Vec<_>>>()?;

    if entries.is_empty() {
        output::header("staffalias log");
        output::warning("No audit entries found");
        if post.is_some() || actor.is_some() {
            println!("  Try removing filters to see all entries.");
        }
        return Ok(());
    }

    // Apply --last N (take from the end)
    if let Some(n) = last {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }

    output::header(&format!("staffalias log ({} entries)", entries.len()));
    println!();

    for entry in &entries {
        print_entry(&workspace, entry);
    }

    Ok(())
}

/// Print a single ledger entry as a formatted row.
fn print_entry(workspace: &Workspace, entry: &AuditEntry) {
    let date = entry.created_at.format("%Y-%m-%d %H:%M:%S");

    println!(
        "  {} {} {:>4} {} {:<7} post #{:<5} by {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        entry.seq,
        "│".dimmed(),
        format_action(entry.action),
        entry.content_id,
        workspace.display_user(entry.real_actor_id),
    );
}

/// Format an ActionKind as a colored string.
fn format_action(action: ActionKind) -> String {
    match action {
        ActionKind::Create => "create".green().to_string(),
        ActionKind::Update => "update".blue().to_string(),
    }
}
