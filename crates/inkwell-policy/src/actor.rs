//! The calling identity.

use crate::evaluator::{evaluate, Decision, Ownership};
use crate::permission::{Action, PermissionSet, ResourceKind};
use chrono::NaiveDate;
use inkwell_common_core::UserId;

/// An authenticated identity together with its expanded permissions.
///
/// Built through [`RoleRegistry::resolve`](crate::RoleRegistry::resolve), so
/// the permission set always equals the union of the assigned roles.
#[derive(Debug, Clone)]
pub struct Actor {
    id: UserId,
    roles: Vec<String>,
    permissions: PermissionSet,
    date_of_birth: Option<NaiveDate>,
}

impl Actor {
    pub(crate) fn new(
        id: UserId,
        roles: Vec<String>,
        permissions: PermissionSet,
        date_of_birth: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            roles,
            permissions,
            date_of_birth,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    /// Ownership of a record owned by `owner`, from this actor's viewpoint.
    pub fn ownership_of(&self, owner: UserId) -> Ownership {
        Ownership::of(self.id, owner)
    }

    pub fn decide(&self, action: Action, resource: ResourceKind, ownership: Ownership) -> Decision {
        evaluate(&self.permissions, action, resource, ownership)
    }

    pub fn can(&self, action: Action, resource: ResourceKind, ownership: Ownership) -> bool {
        self.decide(action, resource, ownership).granted
    }
}
