use crate::core::errors::Result;
use crate::core::models::content_object::{
    ContentObject, CreatePayload, EffectiveAuthor, UpdatePayload,
};

/// Port for the content engine that owns posts, topics and revisions.
///
/// Implementations live in `adapters::content`. Failures are reported as
/// `ValidationFailed`, `ContentNotFound` or `EditConflict` and are passed
/// through the alias layer unchanged.
pub trait ContentEngine: Send + Sync {
    fn find(&self, id: u64) -> Result<Option<ContentObject>>;

    /// Persist a new post written by `author`.
    ///
    /// A post created with `EffectiveAuthor::Alias` carries the
    /// authored-as-alias marker from the same write.
    fn create(&self, author: EffectiveAuthor, payload: &CreatePayload) -> Result<ContentObject>;

    /// Apply an edit, recording `editor` on the new revision.
    fn update(
        &self,
        id: u64,
        editor: EffectiveAuthor,
        payload: &UpdatePayload,
    ) -> Result<ContentObject>;

    /// Durably set the authored-as-alias marker on an existing post.
    fn mark_alias_authored(&self, id: u64) -> Result<ContentObject>;

    fn count_by_author(&self, author_id: u64) -> Result<usize>;

    fn list(&self) -> Result<Vec<ContentObject>>;
}
