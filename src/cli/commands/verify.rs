use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::traits::ledger::AuditLedger;

/// Execute the `staffalias verify` command.
pub fn execute() -> Result<()> {
    let workspace = Workspace::open()?;
    let count = workspace.mediator.ledger.verify()?;

    output::header("staffalias verify");
    if count == 0 {
        output::warning("Ledger is empty");
    } else {
        output::success(&format!("{count} entries verified, hash chain intact"));
        println!("  Ledger: {}", workspace.mediator.ledger.path().display());
    }

    Ok(())
}
