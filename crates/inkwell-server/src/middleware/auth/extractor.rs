//! Authentication extractors for handlers.

use super::types::AuthUser;
use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use inkwell_domain::User;
use inkwell_policy::Actor;

/// The verified token of the caller.
pub struct Auth(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(Auth)
            .ok_or(ApiError::Unauthorized)
    }
}

/// The resolved caller: stored user record plus expanded permissions.
///
/// Present on every route behind the actor resolution middleware.
pub struct CurrentActor {
    pub actor: Actor,
    pub user: User,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or(ApiError::Unauthorized)?;
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(ApiError::Unauthorized)?;
        Ok(Self { actor, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::types::Claims;
    use axum::http::Request;
    use chrono::Utc;
    use inkwell_common_core::UserId;
    use inkwell_policy::{RoleRegistry, MEMBER_ROLE};

    fn user(id: i64) -> User {
        User {
            id: UserId::new(id),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            mobile_number: "0771234567".into(),
            address: "1 Loop Rd".into(),
            date_of_birth: None,
            age: None,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_auth_extractor_success() {
        let claims = Claims::new_access(UserId::new(3), "test@example.com", vec![], 3600);
        let auth_user = AuthUser::from_claims(claims).unwrap();

        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(auth_user);

        let Auth(extracted) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.id, UserId::new(3));
    }

    #[tokio::test]
    async fn test_auth_extractor_missing() {
        let (mut parts, _) = Request::new(()).into_parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_current_actor_requires_both_parts() {
        let actor = RoleRegistry::seeded().resolve(UserId::new(4), vec![MEMBER_ROLE.into()], None);

        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(actor.clone());
        assert!(CurrentActor::from_request_parts(&mut parts, &()).await.is_err());

        parts.extensions.insert(user(4));
        let current = CurrentActor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(current.actor.id(), current.user.id);
    }
}
