//! Handler-side checks for decisions that depend on the target record.

use super::audit::log_authz;
use crate::error::ApiError;
use chrono::NaiveDate;
use inkwell_domain::UserId;
use inkwell_policy::{authorize, authorize_adult, Action, Actor, Ownership, ResourceKind};

/// Require a blanket permission.
pub fn guard(actor: &Actor, action: Action, resource: ResourceKind) -> Result<(), ApiError> {
    check(actor, action, resource, None, Ownership::NotApplicable)
}

/// Require a permission on the record `record_id` owned by `owner`.
pub fn guard_record(
    actor: &Actor,
    action: Action,
    resource: ResourceKind,
    record_id: i64,
    owner: UserId,
) -> Result<(), ApiError> {
    check(actor, action, resource, Some(record_id), actor.ownership_of(owner))
}

/// Require the minimum age and then the permission.
pub fn guard_adult(
    actor: &Actor,
    action: Action,
    resource: ResourceKind,
    today: NaiveDate,
) -> Result<(), ApiError> {
    match authorize_adult(actor, action, resource, today) {
        Ok(_) => {
            log_authz(actor, action, resource, None, Ok(()));
            Ok(())
        }
        Err(denied) => {
            log_authz(actor, action, resource, None, Err(&denied));
            Err(denied.into())
        }
    }
}

fn check(
    actor: &Actor,
    action: Action,
    resource: ResourceKind,
    record_id: Option<i64>,
    ownership: Ownership,
) -> Result<(), ApiError> {
    match authorize(actor, action, resource, ownership) {
        Ok(_) => {
            log_authz(actor, action, resource, record_id, Ok(()));
            Ok(())
        }
        Err(denied) => {
            log_authz(actor, action, resource, record_id, Err(&denied));
            Err(denied.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use inkwell_policy::{RoleRegistry, MEMBER_ROLE};

    fn member(dob: Option<NaiveDate>) -> Actor {
        RoleRegistry::seeded().resolve(UserId::new(1), vec![MEMBER_ROLE.into()], dob)
    }

    #[test]
    fn test_guard_record_uses_ownership() {
        let actor = member(None);
        assert!(guard_record(&actor, Action::Edit, ResourceKind::Posts, 3, UserId::new(1)).is_ok());

        let err = guard_record(&actor, Action::Edit, ResourceKind::Posts, 3, UserId::new(2))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "Unauthorized. You do not have permission to edit this post."
        );
    }

    #[test]
    fn test_guard_adult_reports_age_first() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let minor = member(NaiveDate::from_ymd_opt(2010, 1, 1));
        let err = guard_adult(&minor, Action::Create, ResourceKind::Posts, today).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let adult = member(NaiveDate::from_ymd_opt(1990, 1, 1));
        assert!(guard_adult(&adult, Action::Create, ResourceKind::Posts, today).is_ok());
    }

    #[test]
    fn test_guard_blanket() {
        let actor = member(None);
        assert!(guard(&actor, Action::View, ResourceKind::Posts).is_ok());
        assert!(guard(&actor, Action::Manage, ResourceKind::Roles).is_err());
    }
}
