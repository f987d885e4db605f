use serde::{Deserialize, Serialize};

use crate::core::models::actor::Actor;
use crate::core::models::audit_entry::ActionKind;

/// Why an aliased operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    FeatureDisabled,
    NotStaff,
    WhisperNotAllowed,
    NotAliasAuthored,
}

impl DenyReason {
    pub fn code(self) -> &'static str {
        match self {
            DenyReason::FeatureDisabled => "feature_disabled",
            DenyReason::NotStaff => "not_staff",
            DenyReason::WhisperNotAllowed => "whisper_not_allowed",
            DenyReason::NotAliasAuthored => "not_alias_authored",
        }
    }

    /// Every denial is an authorization failure.
    pub fn http_status(self) -> u16 {
        403
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-operation facts the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationContext {
    Create { is_whisper: bool },
    Update { target_is_alias_authored: bool },
}

impl OperationContext {
    pub fn action_kind(self) -> ActionKind {
        match self {
            OperationContext::Create { .. } => ActionKind::Create,
            OperationContext::Update { .. } => ActionKind::Update,
        }
    }
}

/// Everything the policy engine decides on.
#[derive(Debug, Clone, Copy)]
pub struct PolicyRequest<'a> {
    pub actor: &'a Actor,
    pub requested_as_alias: bool,
    pub context: OperationContext,
}

/// Proof that the policy engine allowed an operation.
///
/// The constructor is crate-private and `PolicyEngine::evaluate` is its
/// only caller, tests included, so a `Permit` with `aliased() == true`
/// has gone through every alias rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permit {
    action: ActionKind,
    aliased: bool,
}

impl Permit {
    pub(crate) fn new(action: ActionKind, aliased: bool) -> Self {
        Self { action, aliased }
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn aliased(&self) -> bool {
        self.aliased
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Permit),
    Deny(DenyReason),
}
