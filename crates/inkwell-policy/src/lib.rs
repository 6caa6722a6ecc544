//! Authorization policy for Inkwell.
//!
//! Decisions are pure functions over an explicit [`PermissionSet`] and an
//! [`Ownership`] fact. Roles only matter as permission sources: the
//! [`RoleRegistry`] expands role names into permissions once, when an
//! [`Actor`] is resolved, and nothing downstream inspects role names again.
//!
//! ```
//! use inkwell_policy::{Action, Ownership, RoleRegistry, ResourceKind};
//! use inkwell_common_core::UserId;
//!
//! let registry = RoleRegistry::seeded();
//! let member = registry.resolve(UserId::new(7), vec!["member".into()], None);
//!
//! let own_post = Ownership::of(member.id(), UserId::new(7));
//! let other_post = Ownership::of(member.id(), UserId::new(8));
//! assert!(member.can(Action::Edit, ResourceKind::Posts, own_post));
//! assert!(!member.can(Action::Edit, ResourceKind::Posts, other_post));
//! ```

pub mod actor;
pub mod age;
pub mod evaluator;
pub mod permission;
pub mod role;

pub use actor::Actor;
pub use age::{authorize_adult, authorize_create, is_adult, Denied, MINIMUM_AGE};
pub use evaluator::{
    authorize, can_perform, denial_message, evaluate, Decision, DecisionReason, Ownership,
};
pub use permission::{Action, Permission, PermissionParseError, PermissionSet, ResourceKind, Scope};
pub use role::{Role, RoleRegistry, ADMIN_ROLE, GUEST_ROLE, MEMBER_ROLE};
