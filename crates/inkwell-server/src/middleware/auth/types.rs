//! Authentication types.

use chrono::Utc;
use inkwell_common_core::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// User email.
    pub email: String,
    /// Role names at the time the token was issued. Informational only:
    /// permissions are always re-read from the database.
    pub roles: Vec<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// JWT ID, recorded on logout.
    pub jti: String,
}

impl Claims {
    /// Create new access token claims.
    pub fn new_access(user_id: UserId, email: &str, roles: Vec<String>, expires_in: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles,
            iat: now,
            exp: now + expires_in,
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.sub).ok()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Verified token contents, inserted into request extensions by the auth layer.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub claims: Claims,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Option<Self> {
        let id = claims.user_id()?;
        Some(Self {
            id,
            email: claims.email.clone(),
            claims,
        })
    }

    /// Token identifier, used for revocation.
    pub fn jti(&self) -> &str {
        &self.claims.jti
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_subject_roundtrip() {
        let claims = Claims::new_access(UserId::new(42), "a@example.com", vec![], 60);
        assert_eq!(claims.user_id(), Some(UserId::new(42)));
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_bad_subject_rejected() {
        let mut claims = Claims::new_access(UserId::new(1), "a@example.com", vec![], 60);
        claims.sub = "not-a-number".into();
        assert!(AuthUser::from_claims(claims).is_none());
    }
}
