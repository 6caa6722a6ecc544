//! The authorization decision function.

use crate::actor::Actor;
use crate::age::Denied;
use crate::permission::{Action, Permission, PermissionSet, ResourceKind};
use inkwell_common_core::UserId;
use serde::Serialize;

/// Relationship between the actor and the target record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// No single record is targeted (list or create).
    NotApplicable,
    Owned,
    NotOwned,
}

impl Ownership {
    pub fn of(actor: UserId, owner: UserId) -> Self {
        if actor == owner {
            Self::Owned
        } else {
            Self::NotOwned
        }
    }
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    BlanketPermission,
    OwnScopedPermission,
    MissingPermission,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub granted: bool,
    pub reason: DecisionReason,
}

impl Decision {
    fn grant(reason: DecisionReason) -> Self {
        Self {
            granted: true,
            reason,
        }
    }

    fn deny() -> Self {
        Self {
            granted: false,
            reason: DecisionReason::MissingPermission,
        }
    }
}

/// Decide whether `permissions` allow `action` on `resource`.
///
/// A blanket grant wins outright. Otherwise the own-scoped grant applies only
/// to an owned record. Everything else is denied.
pub fn evaluate(
    permissions: &PermissionSet,
    action: Action,
    resource: ResourceKind,
    ownership: Ownership,
) -> Decision {
    if permissions.contains(&Permission::any(action, resource)) {
        return Decision::grant(DecisionReason::BlanketPermission);
    }

    if ownership == Ownership::Owned && permissions.contains(&Permission::own(action, resource)) {
        return Decision::grant(DecisionReason::OwnScopedPermission);
    }

    Decision::deny()
}

/// Boolean form of [`evaluate`].
pub fn can_perform(
    permissions: &PermissionSet,
    action: Action,
    resource: ResourceKind,
    ownership: Ownership,
) -> bool {
    evaluate(permissions, action, resource, ownership).granted
}

/// Evaluate for `actor`, turning a denial into [`Denied::MissingPermission`].
pub fn authorize(
    actor: &Actor,
    action: Action,
    resource: ResourceKind,
    ownership: Ownership,
) -> Result<Decision, Denied> {
    let decision = actor.decide(action, resource, ownership);
    if decision.granted {
        Ok(decision)
    } else {
        Err(Denied::MissingPermission { action, resource, ownership })
    }
}

/// Fixed message shown when `action` on `resource` is denied.
pub fn denial_message(action: Action, resource: ResourceKind, ownership: Ownership) -> String {
    match ownership {
        Ownership::NotApplicable => format!(
            "Unauthorized. You do not have permission to {} {}.",
            action, resource
        ),
        Ownership::Owned | Ownership::NotOwned => format!(
            "Unauthorized. You do not have permission to {} this {}.",
            action,
            resource.singular()
        ),
    }
}
