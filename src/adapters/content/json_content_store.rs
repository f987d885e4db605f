use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::adapters::file_io;
use crate::core::errors::{Result, StaffAliasError};
use crate::core::models::content_object::{
    ContentObject, CreatePayload, EffectiveAuthor, Revision, UpdatePayload,
};
use crate::core::traits::content_engine::ContentEngine;

/// Minimal content engine that keeps every post in one JSON document.
///
/// Every read and every read-modify-write holds a lock shared by all
/// handles on the same file, and saves replace the file atomically, so a
/// reader never sees a half-written store and concurrent writers in one
/// process never lose each other's posts or revisions.
pub struct JsonContentStore {
    path: PathBuf,
    min_raw_length: usize,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    next_post_id: u64,
    #[serde(default)]
    next_topic_id: u64,
    #[serde(default)]
    posts: Vec<ContentObject>,
}

impl StoreFile {
    fn topic_exists(&self, topic_id: u64) -> bool {
        self.posts.iter().any(|p| p.topic_id == topic_id)
    }

    fn allocate_post_id(&mut self) -> u64 {
        let highest = self.posts.iter().map(|p| p.id).max().unwrap_or(0);
        let id = self.next_post_id.max(highest + 1);
        self.next_post_id = id + 1;
        id
    }

    fn allocate_topic_id(&mut self) -> u64 {
        let highest = self.posts.iter().map(|p| p.topic_id).max().unwrap_or(0);
        let id = self.next_topic_id.max(highest + 1);
        self.next_topic_id = id + 1;
        id
    }

    fn next_post_number(&self, topic_id: u64) -> u32 {
        self.posts
            .iter()
            .filter(|p| p.topic_id == topic_id)
            .map(|p| p.post_number)
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl JsonContentStore {
    pub fn new(path: PathBuf, min_raw_length: usize) -> Self {
        Self {
            lock: file_io::lock_for(&path),
            path,
            min_raw_length,
        }
    }

    /// Write an empty store if the file does not exist yet.
    pub fn initialize(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() {
            return Ok(());
        }
        self.save(&StoreFile::default())
    }

    /// Read the whole store. Callers hold `lock`.
    ///
    /// A missing file is an empty store. An existing file must hold a
    /// complete document: saves never leave a truncated one behind, so an
    /// empty file means the store was damaged.
    fn load(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Err(StaffAliasError::StoreError {
                detail: format!("Content store {} is empty", self.path.display()),
            });
        }
        serde_json::from_str(&content).map_err(|e| StaffAliasError::StoreError {
            detail: format!("Malformed content store {}: {e}", self.path.display()),
        })
    }

    fn load_locked(&self) -> Result<StoreFile> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    fn save(&self, file: &StoreFile) -> Result<()> {
        let content = serde_json::to_string_pretty(file).map_err(|e| StaffAliasError::StoreError {
            detail: format!("Failed to serialize content store: {e}"),
        })?;
        file_io::write_atomic(&self.path, content.as_bytes())
    }

    fn validate_raw(&self, raw: &str) -> Result<()> {
        let length = raw.trim().chars().count();
        if length < self.min_raw_length.max(1) {
            return Err(StaffAliasError::ValidationFailed {
                detail: format!(
                    "Body is too short ({length} characters, minimum is {})",
                    self.min_raw_length.max(1)
                ),
            });
        }
        Ok(())
    }
}

impl ContentEngine for JsonContentStore {
    fn find(&self, id: u64) -> Result<Option<ContentObject>> {
        Ok(self.load_locked()?.posts.into_iter().find(|p| p.id == id))
    }

    fn create(&self, author: EffectiveAuthor, payload: &CreatePayload) -> Result<ContentObject> {
        self.validate_raw(&payload.raw)?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.load()?;

        let topic_id = match payload.topic_id {
            Some(topic_id) if file.topic_exists(topic_id) => topic_id,
            Some(topic_id) => {
                return Err(StaffAliasError::ValidationFailed {
                    detail: format!("Topic {topic_id} does not exist"),
                });
            }
            None => file.allocate_topic_id(),
        };

        if let Some(number) = payload.reply_to_post_number
            && !file
                .posts
                .iter()
                .any(|p| p.topic_id == topic_id && p.post_number == number)
        {
            return Err(StaffAliasError::ValidationFailed {
                detail: format!("Post #{number} does not exist in topic {topic_id}"),
            });
        }

        let post = ContentObject {
            id: file.allocate_post_id(),
            topic_id,
            post_number: file.next_post_number(topic_id),
            reply_to_post_number: payload.reply_to_post_number,
            author_id: author.user_id(),
            raw: payload.raw.clone(),
            whisper: payload.whisper,
            authored_as_alias: matches!(author, EffectiveAuthor::Alias(_)),
            created_at: Utc::now(),
            revisions: Vec::new(),
        };
        file.posts.push(post.clone());
        self.save(&file)?;
        Ok(post)
    }

    fn update(
        &self,
        id: u64,
        editor: EffectiveAuthor,
        payload: &UpdatePayload,
    ) -> Result<ContentObject> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.load()?;

        let post = file
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StaffAliasError::ContentNotFound { id })?;

        if let Some(expected) = payload.expected_revision
            && expected != post.revision_count()
        {
            return Err(StaffAliasError::EditConflict {
                id,
                expected,
                actual: post.revision_count(),
            });
        }

        self.validate_raw(&payload.raw)?;

        if post.raw == payload.raw {
            return Ok(post.clone());
        }

        let revision = Revision {
            number: post.revision_count() + 1,
            editor_id: editor.user_id(),
            previous_raw: std::mem::replace(&mut post.raw, payload.raw.clone()),
            edit_reason: payload.edit_reason.clone(),
            created_at: Utc::now(),
        };
        post.revisions.push(revision);

        let updated = post.clone();
        self.save(&file)?;
        Ok(updated)
    }

    fn mark_alias_authored(&self, id: u64) -> Result<ContentObject> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.load()?;

        let post = file
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StaffAliasError::ContentNotFound { id })?;
        post.authored_as_alias = true;

        let marked = post.clone();
        self.save(&file)?;
        Ok(marked)
    }

    fn count_by_author(&self, author_id: u64) -> Result<usize> {
        Ok(self
            .load_locked()?
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .count())
    }

    fn list(&self) -> Result<Vec<ContentObject>> {
        Ok(self.load_locked()?.posts)
    }
}
