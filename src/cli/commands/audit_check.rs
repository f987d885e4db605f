use crate::cli::context::Workspace;
use crate::core::errors::Result;
use crate::core::models::audit_entry::ActionKind;
use crate::core::traits::ledger::AuditLedger;

/// Execute the `staffalias audit-check` command.
///
/// Prints `yes` or `no` and returns whether a matching entry exists.
pub fn execute(actor: &str, post: u64, action: ActionKind) -> Result<bool> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(actor)?;

    let found = workspace.mediator.ledger.exists(actor.id, post, action)?;
    println!("{}", if found { "yes" } else { "no" });

    Ok(found)
}
