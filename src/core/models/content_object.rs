use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as persisted by the content engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentObject {
    pub id: u64,
    pub topic_id: u64,
    /// Position inside the topic, starting at 1.
    pub post_number: u32,
    pub reply_to_post_number: Option<u32>,
    pub author_id: u64,
    pub raw: String,
    #[serde(default)]
    pub whisper: bool,
    /// Set once the post was created through an aliased operation.
    #[serde(default)]
    pub authored_as_alias: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

impl ContentObject {
    pub fn revision_count(&self) -> u32 {
        self.revisions.len() as u32
    }

    pub fn latest_revision(&self) -> Option<&Revision> {
        self.revisions.last()
    }
}

/// One edit of a post. The editor is whoever the content engine was told
/// made the change, which for aliased edits is the alias account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub number: u32,
    pub editor_id: u64,
    pub previous_raw: String,
    pub edit_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatePayload {
    pub raw: String,
    /// `None` opens a new topic.
    pub topic_id: Option<u64>,
    pub reply_to_post_number: Option<u32>,
    pub whisper: bool,
    /// The per-request "post as the alias" flag.
    pub as_alias: bool,
}

/// Input for editing a post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    pub raw: String,
    pub edit_reason: Option<String>,
    /// Revision count the caller last saw; a mismatch is an edit conflict.
    pub expected_revision: Option<u32>,
    pub as_alias: bool,
}

/// The identity handed to the content engine as author or editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveAuthor {
    /// The real actor, on the ordinary non-aliased path.
    Actor(u64),
    /// The alias account, substituted for the real actor.
    Alias(u64),
}

impl EffectiveAuthor {
    pub fn user_id(self) -> u64 {
        match self {
            EffectiveAuthor::Actor(id) | EffectiveAuthor::Alias(id) => id,
        }
    }
}
