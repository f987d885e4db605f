pub mod audit_check;
pub mod edit;
pub mod init;
pub mod log;
pub mod post;
pub mod show;
pub mod status;
pub mod users;
pub mod verify;

use crate::cli::output;
use crate::core::services::request_mediator::AuditStatus;

/// Tell the user what happened to the attribution of an operation.
///
/// A failed ledger write is a warning, not an error: the post or edit
/// itself has already been saved.
pub fn report_audit(audit: &AuditStatus) {
    match audit {
        AuditStatus::NotRequired => {}
        AuditStatus::Recorded(entry) => {
            output::success(&format!("Attributed in audit ledger (entry {})", entry.seq));
        }
        AuditStatus::Failed(detail) => {
            output::warning(&format!(
                "Saved, but the audit entry could not be written: {detail}"
            ));
        }
    }
}
