mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use crate::core::models::content_object::{CreatePayload, UpdatePayload};

fn main() {
    let args = Cli::parse();

    init_tracing(args.verbose);
    cli::context::init(args.dir.as_deref());

    let result = match &args.command {
        Commands::Init {
            alias_username,
            enable,
        } => cli::commands::init::execute(alias_username, *enable, args.verbose),
        Commands::Users { action } => cli::commands::users::execute(action),
        Commands::Post {
            actor,
            raw,
            topic,
            reply_to,
            whisper,
            as_alias,
        } => cli::commands::post::execute(
            actor,
            CreatePayload {
                raw: raw.clone(),
                topic_id: *topic,
                reply_to_post_number: *reply_to,
                whisper: *whisper,
                as_alias: *as_alias,
            },
        ),
        Commands::Edit {
            id,
            actor,
            raw,
            reason,
            expected_revision,
            as_alias,
        } => cli::commands::edit::execute(
            *id,
            actor,
            UpdatePayload {
                raw: raw.clone(),
                edit_reason: reason.clone(),
                expected_revision: *expected_revision,
                as_alias: *as_alias,
            },
        ),
        Commands::Show { id } => cli::commands::show::execute(*id),
        Commands::Log { post, actor, last } => {
            cli::commands::log::execute(*post, actor.as_deref(), *last)
        }
        Commands::AuditCheck {
            actor,
            post,
            action,
        } => match cli::commands::audit_check::execute(actor, *post, *action) {
            Ok(true) => Ok(()),
            Ok(false) => std::process::exit(1),
            Err(e) => Err(e),
        },
        Commands::Verify => cli::commands::verify::execute(),
        Commands::Status => cli::commands::status::execute(),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Operational logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "staffalias=debug" } else { "staffalias=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
