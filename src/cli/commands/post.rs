use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::content_object::CreatePayload;

/// Execute the `staffalias post` command.
pub fn execute(actor: &str, payload: CreatePayload) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(actor)?;

    let completed = workspace.mediator.handle_create(&actor, &payload)?.into_completed()?;
    let post = &completed.content;

    output::success(&format!(
        "Created post #{} (topic {}, post number {}) as {}",
        post.id,
        post.topic_id,
        post.post_number,
        workspace.display_user(post.author_id)
    ));
    super::report_audit(&completed.audit);

    Ok(())
}
