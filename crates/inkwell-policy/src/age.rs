//! Minimum-age gate for creating content.

use crate::actor::Actor;
use crate::evaluator::{authorize, denial_message, Decision, Ownership};
use crate::permission::{Action, ResourceKind};
use chrono::NaiveDate;
use inkwell_common_core::UserId;
use inkwell_domain::age_on;
use thiserror::Error;

/// Youngest age allowed to create content.
pub const MINIMUM_AGE: u32 = 18;

/// Whether someone born on `birth` is at least [`MINIMUM_AGE`] on `today`.
///
/// A missing birth date or one in the future counts as ineligible.
pub fn is_adult(birth: Option<NaiveDate>, today: NaiveDate) -> bool {
    birth
        .and_then(|birth| age_on(birth, today))
        .map(|age| age >= MINIMUM_AGE)
        .unwrap_or(false)
}

/// A refused authorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denied {
    /// The actor is under [`MINIMUM_AGE`] or has no usable birth date.
    #[error(
        "The user must be at least {} years old to create a {}.",
        MINIMUM_AGE,
        .resource.singular()
    )]
    Underage { actor: UserId, resource: ResourceKind },
    /// The actor lacks the permission.
    #[error("{}", denial_message(*.action, *.resource, *.ownership))]
    MissingPermission {
        action: Action,
        resource: ResourceKind,
        ownership: Ownership,
    },
}

/// Gate an action that produces content: the age check runs first, then the
/// permission for `action` on `resource`.
pub fn authorize_adult(
    actor: &Actor,
    action: Action,
    resource: ResourceKind,
    today: NaiveDate,
) -> Result<Decision, Denied> {
    if !is_adult(actor.date_of_birth(), today) {
        return Err(Denied::Underage {
            actor: actor.id(),
            resource,
        });
    }
    authorize(actor, action, resource, Ownership::NotApplicable)
}

/// Gate a create with [`authorize_adult`].
pub fn authorize_create(
    actor: &Actor,
    resource: ResourceKind,
    today: NaiveDate,
) -> Result<(), Denied> {
    authorize_adult(actor, Action::Create, resource, today).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{RoleRegistry, GUEST_ROLE, MEMBER_ROLE};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_is_adult_boundaries() {
        let today = date(2024, 3, 10);
        assert!(is_adult(Some(date(2006, 3, 10)), today));
        assert!(!is_adult(Some(date(2006, 3, 11)), today));
        assert!(!is_adult(None, today));
        assert!(!is_adult(Some(date(2025, 1, 1)), today));
    }

    #[test]
    fn test_authorize_create_checks_age_before_permission() {
        let registry = RoleRegistry::seeded();
        let today = date(2024, 3, 10);

        // A 17-year-old guest lacks both; the age gate is reported.
        let minor_guest =
            registry.resolve(UserId::new(1), vec![GUEST_ROLE.into()], Some(date(2007, 1, 1)));
        let err = authorize_create(&minor_guest, ResourceKind::Posts, today).unwrap_err();
        assert!(matches!(err, Denied::Underage { .. }));
        assert_eq!(
            err.to_string(),
            "The user must be at least 18 years old to create a post."
        );

        let adult_guest =
            registry.resolve(UserId::new(2), vec![GUEST_ROLE.into()], Some(date(1990, 1, 1)));
        let err = authorize_create(&adult_guest, ResourceKind::Posts, today).unwrap_err();
        assert!(matches!(err, Denied::MissingPermission { .. }));
        assert_eq!(
            err.to_string(),
            "Unauthorized. You do not have permission to create posts."
        );

        let adult_member =
            registry.resolve(UserId::new(3), vec![MEMBER_ROLE.into()], Some(date(1990, 1, 1)));
        assert!(authorize_create(&adult_member, ResourceKind::Posts, today).is_ok());
    }

    #[test]
    fn test_missing_birth_date_fails_closed() {
        let registry = RoleRegistry::seeded();
        let member = registry.resolve(UserId::new(4), vec![MEMBER_ROLE.into()], None);
        let result = authorize_create(&member, ResourceKind::Posts, date(2024, 1, 1));
        assert!(matches!(result, Err(Denied::Underage { .. })));
    }

    #[test]
    fn test_denial_boxes_as_std_error() {
        let registry = RoleRegistry::seeded();
        let minor = registry.resolve(
            UserId::new(7),
            vec![MEMBER_ROLE.into()],
            Some(date(2015, 1, 1)),
        );
        let result: Result<(), Box<dyn std::error::Error + Send + Sync>> =
            authorize_create(&minor, ResourceKind::Posts, date(2024, 1, 1)).map_err(Into::into);

        let err = result.unwrap_err();
        assert!(err.source().is_none());
        assert_eq!(
            err.to_string(),
            "The user must be at least 18 years old to create a post."
        );
        assert!(err.downcast_ref::<Denied>().is_some());
    }

    #[test]
    fn test_import_gate_uses_import_permission() {
        let registry = RoleRegistry::seeded();
        let today = date(2024, 3, 10);
        let member =
            registry.resolve(UserId::new(5), vec![MEMBER_ROLE.into()], Some(date(1990, 1, 1)));

        let err = authorize_adult(&member, Action::Import, ResourceKind::Posts, today).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unauthorized. You do not have permission to import posts."
        );

        let admin = registry.resolve(
            UserId::new(6),
            vec![crate::role::ADMIN_ROLE.into()],
            Some(date(2010, 1, 1)),
        );
        let err = authorize_adult(&admin, Action::Import, ResourceKind::Posts, today).unwrap_err();
        assert!(matches!(err, Denied::Underage { .. }));
    }
}
