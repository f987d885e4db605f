use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::content_object::UpdatePayload;
use crate::core::traits::content_engine::ContentEngine;

/// Execute the `staffalias edit` command.
pub fn execute(id: u64, actor: &str, payload: UpdatePayload) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(actor)?;

    let before = workspace
        .mediator
        .content
        .find(id)?
        .map_or(0, |post| post.revision_count());

    let completed = workspace.mediator.handle_update(&actor, id, &payload)?.into_completed()?;
    let post = &completed.content;

    match post.latest_revision() {
        Some(revision) if post.revision_count() > before => output::success(&format!(
            "Post #{} is now at revision {} (edited by {})",
            post.id,
            revision.number,
            workspace.display_user(revision.editor_id)
        )),
        _ => output::warning(&format!("Post #{} unchanged (same body as before)", post.id)),
    }
    super::report_audit(&completed.audit);

    Ok(())
}
