use colored::Colorize;

use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::traits::content_engine::ContentEngine;
use crate::core::traits::ledger::AuditLedger;

/// Execute the `staffalias show` command.
///
/// Prints the post, its revision history, and the real users behind any
/// aliased operations on it.
pub fn execute(id: u64) -> Result<()> {
    let workspace = Workspace::open()?;
    let mediator = &workspace.mediator;

    let post = mediator
        .content
        .find(id)?
        .ok_or(StaffAliasError::ContentNotFound { id })?;

    output::header(&format!("Post #{}", post.id));
    output::field("topic", &format!("{} (post number {})", post.topic_id, post.post_number));
    if let Some(number) = post.reply_to_post_number {
        output::field("reply to", &format!("#{number}"));
    }
    output::field("author", &workspace.display_user(post.author_id));
    output::field("alias post", if post.authored_as_alias { "yes" } else { "no" });
    if post.whisper {
        output::field("whisper", "yes");
    }
    output::field("created", &post.created_at.format("%Y-%m-%d %H:%M:%S").to_string());
    println!("\n  {}", post.raw);

    if !post.revisions.is_empty() {
        output::header(&format!("Revisions ({})", post.revisions.len()));
        for revision in &post.revisions {
            println!(
                "  {} {} by {}{}",
                format!("r{}", revision.number).cyan(),
                revision.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                workspace.display_user(revision.editor_id),
                revision
                    .edit_reason
                    .as_deref()
                    .map(|r| format!(" ({r})"))
                    .unwrap_or_default()
            );
        }
    }

    let entries = mediator.ledger.entries_for(post.id)?.collect::<Result<Vec<_>>>()?;
    if !entries.is_empty() {
        output::header("Attribution");
        for entry in &entries {
            println!(
                "  {} {:<7} {}",
                entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                entry.action.to_string(),
                workspace.display_user(entry.real_actor_id)
            );
        }
    }

    Ok(())
}
