use crate::core::errors::Result;
use crate::core::models::actor::Actor;
use crate::core::models::alias_identity::AliasIdentity;
use crate::core::models::content_object::{ContentObject, EffectiveAuthor};
use crate::core::models::decision::Permit;
use crate::core::traits::content_engine::ContentEngine;

/// Swaps the real actor for the alias account on allowed aliased
/// operations, and marks what the alias wrote.
pub struct IdentitySubstitutor;

impl IdentitySubstitutor {
    /// The alias account as author (or, on update, as revision editor).
    pub fn prepare_author(&self, permit: &Permit, alias: &AliasIdentity) -> EffectiveAuthor {
        debug_assert!(permit.aliased(), "prepare_author called for a non-aliased permit");
        EffectiveAuthor::Alias(alias.id)
    }

    /// Who the content engine should see for this permit.
    ///
    /// Non-aliased permits keep the real actor.
    pub fn effective_author(
        &self,
        permit: &Permit,
        actor: &Actor,
        alias: Option<&AliasIdentity>,
    ) -> EffectiveAuthor {
        match alias {
            Some(alias) if permit.aliased() => self.prepare_author(permit, alias),
            _ => EffectiveAuthor::Actor(actor.id),
        }
    }

    /// Make sure a freshly created alias post carries the marker.
    ///
    /// Engines that mark alias posts as part of `create` need no second
    /// write; anything still unmarked is marked through the engine.
    pub fn mark_as_alias_authored<C: ContentEngine + ?Sized>(
        &self,
        engine: &C,
        content: &ContentObject,
    ) -> Result<ContentObject> {
        if content.authored_as_alias {
            return Ok(content.clone());
        }
        engine.mark_alias_authored(content.id)
    }
}
