//! Roles and the role registry.

use crate::actor::Actor;
use crate::permission::{Action, Permission, PermissionParseError, PermissionSet, ResourceKind};
use chrono::NaiveDate;
use inkwell_common_core::UserId;
use std::collections::HashMap;
use tracing::debug;

/// Full-access role.
pub const ADMIN_ROLE: &str = "admin";
/// Default role for registered and imported accounts.
pub const MEMBER_ROLE: &str = "member";
/// Read-only role.
pub const GUEST_ROLE: &str = "guest";

/// A named bundle of permissions.
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub permissions: PermissionSet,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: PermissionSet::new(),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// Grant every permission in the catalogue.
    pub fn with_full_access(mut self) -> Self {
        for permission in Permission::catalogue() {
            self.permissions.insert(permission);
        }
        self
    }
}

/// Maps role names to their permissions.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: HashMap<String, Role>,
}

impl RoleRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the default `admin`, `member` and `guest` roles.
    pub fn seeded() -> Self {
        let mut registry = Self::new();
        registry.register(Self::admin_role());
        registry.register(Self::member_role());
        registry.register(Self::guest_role());
        registry
    }

    fn admin_role() -> Role {
        Role::new(ADMIN_ROLE).with_full_access()
    }

    fn member_role() -> Role {
        Role::new(MEMBER_ROLE)
            .with_permission(Permission::any(Action::View, ResourceKind::Posts))
            .with_permission(Permission::any(Action::Create, ResourceKind::Posts))
            .with_permission(Permission::own(Action::View, ResourceKind::Posts))
            .with_permission(Permission::own(Action::Edit, ResourceKind::Posts))
            .with_permission(Permission::own(Action::Delete, ResourceKind::Posts))
    }

    fn guest_role() -> Role {
        Role::new(GUEST_ROLE).with_permission(Permission::any(Action::View, ResourceKind::Posts))
    }

    /// Build a registry from `(role, permission name)` grant pairs, as stored
    /// in the role tables. Roles without grants must be listed in `roles`.
    pub fn from_grants<R, G>(roles: R, grants: G) -> Result<Self, PermissionParseError>
    where
        R: IntoIterator<Item = String>,
        G: IntoIterator<Item = (String, String)>,
    {
        let mut registry = Self::new();
        for name in roles {
            registry.register(Role::new(name));
        }
        for (role, permission) in grants {
            let permission: Permission = permission.parse()?;
            registry
                .roles
                .entry(role.clone())
                .or_insert_with(|| Role::new(role))
                .permissions
                .insert(permission);
        }
        Ok(registry)
    }

    pub fn register(&mut self, role: Role) {
        self.roles.insert(role.name.clone(), role);
    }

    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Sorted role names.
    pub fn role_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.roles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Union of the permissions of every named role. Unknown roles add nothing.
    pub fn permissions_for<S: AsRef<str>>(&self, roles: &[S]) -> PermissionSet {
        let mut permissions = PermissionSet::new();
        for name in roles {
            match self.roles.get(name.as_ref()) {
                Some(role) => permissions.extend_from(&role.permissions),
                None => debug!(role = %name.as_ref(), "Ignoring unknown role"),
            }
        }
        permissions
    }

    /// Build the actor for a user holding `roles`.
    pub fn resolve(
        &self,
        id: UserId,
        roles: Vec<String>,
        date_of_birth: Option<NaiveDate>,
    ) -> Actor {
        let permissions = self.permissions_for(&roles);
        Actor::new(id, roles, permissions, date_of_birth)
    }
}
