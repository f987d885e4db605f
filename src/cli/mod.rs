pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

use crate::core::models::audit_entry::ActionKind;

/// Post and edit as the staff alias while keeping track of who really did it.
#[derive(Parser, Debug)]
#[command(name = "staffalias", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: .staffalias)
    #[arg(long, global = true, env = "STAFFALIAS_DIR")]
    pub dir: Option<String>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory with default configuration
    Init {
        /// Username of the shared alias account
        #[arg(long, default_value = "staff_alias")]
        alias_username: String,
        /// Turn alias posting on right away
        #[arg(long)]
        enable: bool,
    },

    /// Manage users in the bundled user directory
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Create a post, optionally as the alias
    Post {
        /// Acting user
        #[arg(long)]
        actor: String,
        /// Post body
        #[arg(long)]
        raw: String,
        /// Existing topic to reply in (omit to open a new topic)
        #[arg(long)]
        topic: Option<u64>,
        /// Post number being replied to
        #[arg(long)]
        reply_to: Option<u32>,
        /// Staff-only whisper
        #[arg(long)]
        whisper: bool,
        /// Post as the alias account
        #[arg(long)]
        as_alias: bool,
    },

    /// Edit a post, optionally as the alias
    Edit {
        /// Post id
        id: u64,
        /// Acting user
        #[arg(long)]
        actor: String,
        /// New post body
        #[arg(long)]
        raw: String,
        /// Edit reason shown in the revision history
        #[arg(long)]
        reason: Option<String>,
        /// Fail if the post has moved past this revision
        #[arg(long)]
        expected_revision: Option<u32>,
        /// Edit as the alias account
        #[arg(long)]
        as_alias: bool,
    },

    /// Show a post with its revisions and attribution history
    Show {
        /// Post id
        id: u64,
    },

    /// Show attribution ledger entries
    Log {
        /// Only entries for this post
        #[arg(long)]
        post: Option<u64>,
        /// Only entries by this real user
        #[arg(long)]
        actor: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },

    /// Check whether a user performed an aliased action on a post
    AuditCheck {
        /// Real user
        #[arg(long)]
        actor: String,
        /// Post id
        #[arg(long)]
        post: u64,
        /// create or update
        #[arg(long)]
        action: ActionKind,
    },

    /// Verify the integrity of the attribution ledger
    Verify,

    /// Show alias configuration and data status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// Add a user
    Add {
        username: String,
        /// Moderator or admin
        #[arg(long)]
        staff: bool,
    },
    /// List users
    List,
    /// Remove a user
    Remove { username: String },
}
