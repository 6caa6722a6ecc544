//! Permission vocabulary.
//!
//! A permission is named `"<action> <resource>"` for blanket grants and
//! `"<action> own <resource>"` for grants that only apply to records the actor
//! owns, e.g. `"edit posts"` and `"edit own posts"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Actions that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Import,
    Export,
    Manage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::Export => "export",
            Self::Manage => "manage",
        }
    }
}

impl FromStr for Action {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "import" => Ok(Self::Import),
            "export" => Ok(Self::Export),
            "manage" => Ok(Self::Manage),
            other => Err(PermissionParseError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource types subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Posts,
    Users,
    Categories,
    Exports,
    Roles,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Users => "users",
            Self::Categories => "categories",
            Self::Exports => "exports",
            Self::Roles => "roles",
        }
    }

    /// Singular noun, used in denial messages about one record.
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Posts => "post",
            Self::Users => "user",
            Self::Categories => "category",
            Self::Exports => "export",
            Self::Roles => "role",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posts" => Ok(Self::Posts),
            "users" => Ok(Self::Users),
            "categories" => Ok(Self::Categories),
            "exports" => Ok(Self::Exports),
            "roles" => Ok(Self::Roles),
            other => Err(PermissionParseError::UnknownResource(other.to_string())),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a permission applies to every record or only owned ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Any,
    Own,
}

/// A single named grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permission {
    pub action: Action,
    pub scope: Scope,
    pub resource: ResourceKind,
}

impl Permission {
    /// Blanket permission, e.g. `"edit posts"`.
    pub const fn any(action: Action, resource: ResourceKind) -> Self {
        Self {
            action,
            scope: Scope::Any,
            resource,
        }
    }

    /// Own-scoped permission, e.g. `"edit own posts"`.
    pub const fn own(action: Action, resource: ResourceKind) -> Self {
        Self {
            action,
            scope: Scope::Own,
            resource,
        }
    }

    /// Every permission the system knows about.
    pub fn catalogue() -> Vec<Permission> {
        use Action::*;
        use ResourceKind::*;

        vec![
            Self::any(View, Posts),
            Self::any(Create, Posts),
            Self::any(Edit, Posts),
            Self::any(Delete, Posts),
            Self::own(View, Posts),
            Self::own(Edit, Posts),
            Self::own(Delete, Posts),
            Self::any(Import, Users),
            Self::any(Import, Posts),
            Self::any(Delete, Exports),
            Self::any(Manage, Roles),
        ]
    }

    /// Canonical permission name.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Any => write!(f, "{} {}", self.action, self.resource),
            Scope::Own => write!(f, "{} own {}", self.action, self.resource),
        }
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [action, resource] => Ok(Self::any(action.parse()?, resource.parse()?)),
            [action, "own", resource] => Ok(Self::own(action.parse()?, resource.parse()?)),
            _ => Err(PermissionParseError::Malformed(s.to_string())),
        }
    }
}

impl Serialize for Permission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Error parsing a permission name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionParseError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("malformed permission name: {0}")]
    Malformed(String),
}

/// A set of granted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from permission names.
    pub fn from_names<I, S>(names: I) -> Result<Self, PermissionParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    /// Check a permission by name. Unknown names are never held.
    pub fn contains_name(&self, name: &str) -> bool {
        name.parse::<Permission>()
            .map(|p| self.contains(&p))
            .unwrap_or(false)
    }

    /// Add every permission of `other` to this set.
    pub fn extend_from(&mut self, other: &PermissionSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    /// Permission names in alphabetical order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.iter().map(Permission::name).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
