use crate::core::models::decision::{Decision, DenyReason, OperationContext, Permit, PolicyRequest};

/// Decides whether an actor may act as the alias for one operation.
///
/// Pure: no I/O, no clock, no shared state. `alias_available` is the
/// registry's answer to "is aliasing enabled and resolvable right now".
pub struct PolicyEngine;

impl PolicyEngine {
    /// Rules, in order:
    ///
    /// 1. Not asking for the alias is always allowed.
    /// 2. Aliasing must be available (`feature_disabled`).
    /// 3. The actor must be staff (`not_staff`).
    /// 4. An aliased create must not be a whisper (`whisper_not_allowed`).
    /// 5. An aliased update must target alias-authored content
    ///    (`not_alias_authored`).
    pub fn evaluate(&self, request: &PolicyRequest<'_>, alias_available: bool) -> Decision {
        let action = request.context.action_kind();

        if !request.requested_as_alias {
            return Decision::Allow(Permit::new(action, false));
        }

        if !alias_available {
            return Decision::Deny(DenyReason::FeatureDisabled);
        }

        if !request.actor.staff {
            return Decision::Deny(DenyReason::NotStaff);
        }

        match request.context {
            OperationContext::Create { is_whisper: true } => {
                Decision::Deny(DenyReason::WhisperNotAllowed)
            }
            OperationContext::Update {
                target_is_alias_authored: false,
            } => Decision::Deny(DenyReason::NotAliasAuthored),
            _ => Decision::Allow(Permit::new(action, true)),
        }
    }
}
