use crate::core::errors::{Result, StaffAliasError};
use crate::core::models::actor::Actor;
use crate::core::models::audit_entry::{ActionKind, AuditEntry};
use crate::core::models::content_object::{ContentObject, CreatePayload, UpdatePayload};
use crate::core::models::decision::{Decision, DenyReason, OperationContext, PolicyRequest};
use crate::core::services::alias_registry::AliasRegistry;
use crate::core::services::identity_substitutor::IdentitySubstitutor;
use crate::core::services::policy_engine::PolicyEngine;
use crate::core::traits::content_engine::ContentEngine;
use crate::core::traits::ledger::AuditLedger;
use crate::core::traits::user_directory::UserDirectory;

/// What happened to the audit entry of a completed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditStatus {
    /// Ordinary, non-aliased operation: nothing to attribute.
    NotRequired,
    Recorded(AuditEntry),
    /// The content change committed but the ledger write did not.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    pub content: ContentObject,
    pub audit: AuditStatus,
}

/// Result of a create or update request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Completed),
    /// Refused by policy. Nothing was written.
    Denied(DenyReason),
}

impl Outcome {
    /// Turn a denial into `Forbidden`, for callers that only want the content.
    pub fn into_completed(self) -> Result<Completed> {
        match self {
            Outcome::Completed(completed) => Ok(completed),
            Outcome::Denied(reason) => Err(StaffAliasError::Forbidden { reason }),
        }
    }
}

/// Single entry point for create and update requests.
///
/// Per request: policy check, then either a denial (terminal, no side
/// effects) or the content mutation followed by the audit write. There is
/// no state carried between requests apart from the registry's cache.
pub struct RequestMediator<D: UserDirectory, C: ContentEngine, L: AuditLedger> {
    pub registry: AliasRegistry,
    pub directory: D,
    pub content: C,
    pub ledger: L,
}

impl<D: UserDirectory, C: ContentEngine, L: AuditLedger> RequestMediator<D, C, L> {
    pub fn handle_create(&self, actor: &Actor, payload: &CreatePayload) -> Result<Outcome> {
        let alias = if payload.as_alias {
            self.registry.available_identity(&self.directory)?
        } else {
            None
        };

        let request = PolicyRequest {
            actor,
            requested_as_alias: payload.as_alias,
            context: OperationContext::Create {
                is_whisper: payload.whisper,
            },
        };
        let permit = match PolicyEngine.evaluate(&request, alias.is_some()) {
            Decision::Allow(permit) => permit,
            Decision::Deny(reason) => {
                tracing::debug!(actor = %actor, %reason, "aliased create denied");
                return Ok(Outcome::Denied(reason));
            }
        };

        let author = IdentitySubstitutor.effective_author(&permit, actor, alias.as_ref());
        let created = self.content.create(author, payload)?;

        if !permit.aliased() {
            return Ok(Outcome::Completed(Completed {
                content: created,
                audit: AuditStatus::NotRequired,
            }));
        }

        // Engines that cannot mark inside `create` get a second write. The
        // post exists whether or not that write sticks, so it is
        // attributed before a marker failure is reported.
        let marked = IdentitySubstitutor.mark_as_alias_authored(&self.content, &created);
        let audit = self.record_audit(actor, created.id, permit.action());
        let content = marked?;

        Ok(Outcome::Completed(Completed { content, audit }))
    }

    pub fn handle_update(
        &self,
        actor: &Actor,
        content_id: u64,
        payload: &UpdatePayload,
    ) -> Result<Outcome> {
        let target = self
            .content
            .find(content_id)?
            .ok_or(StaffAliasError::ContentNotFound { id: content_id })?;

        let alias = if payload.as_alias {
            self.registry.available_identity(&self.directory)?
        } else {
            None
        };

        let request = PolicyRequest {
            actor,
            requested_as_alias: payload.as_alias,
            context: OperationContext::Update {
                target_is_alias_authored: target.authored_as_alias,
            },
        };
        let permit = match PolicyEngine.evaluate(&request, alias.is_some()) {
            Decision::Allow(permit) => permit,
            Decision::Deny(reason) => {
                tracing::debug!(actor = %actor, content_id, %reason, "aliased update denied");
                return Ok(Outcome::Denied(reason));
            }
        };

        let editor = IdentitySubstitutor.effective_author(&permit, actor, alias.as_ref());
        let content = self.content.update(content_id, editor, payload)?;

        let audit = if permit.aliased() {
            self.record_audit(actor, content.id, permit.action())
        } else {
            AuditStatus::NotRequired
        };

        Ok(Outcome::Completed(Completed { content, audit }))
    }

    /// Write the ledger entry. A failure here never undoes the mutation;
    /// it is logged for operators and reported in the outcome.
    fn record_audit(&self, actor: &Actor, content_id: u64, action: ActionKind) -> AuditStatus {
        match self.ledger.record(actor.id, content_id, action) {
            Ok(entry) => {
                tracing::debug!(actor_id = actor.id, content_id, %action, seq = entry.seq, "aliased operation attributed");
                AuditStatus::Recorded(entry)
            }
            Err(e) => {
                tracing::error!(
                    actor_id = actor.id,
                    content_id,
                    %action,
                    error = %e,
                    "aliased operation committed but its audit entry could not be written"
                );
                AuditStatus::Failed(e.to_string())
            }
        }
    }
}
