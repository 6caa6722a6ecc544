//! Authentication middleware layer.

use super::{jwt::decode_token, types::AuthUser};
use crate::error::ApiError;
use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

/// Verifies the bearer token and inserts an [`AuthUser`] into the request.
#[derive(Clone)]
pub struct AuthLayer {
    jwt_secret: Arc<String>,
}

impl AuthLayer {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Arc::new(jwt_secret.into()),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_secret: self.jwt_secret.clone(),
        }
    }
}

/// Authentication middleware service.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_secret: Arc<String>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt_secret = self.jwt_secret.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match authenticate(&req, &jwt_secret) {
                Ok(auth_user) => {
                    req.extensions_mut().insert(auth_user);
                    inner.call(req).await
                }
                Err(err) => {
                    debug!(error = %err, path = %req.uri().path(), "Rejected unauthenticated request");
                    Ok(err.into_response())
                }
            }
        })
    }
}

fn authenticate(req: &Request<Body>, secret: &str) -> Result<AuthUser, ApiError> {
    let token = extract_token(req)?;
    let claims = decode_token(&token, secret)?;
    if claims.is_expired() {
        return Err(ApiError::TokenExpired);
    }
    AuthUser::from_claims(claims).ok_or(ApiError::InvalidToken)
}

fn extract_token(req: &Request<Body>) -> Result<String, ApiError> {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| ApiError::InvalidToken)?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    if let Some(cookie_header) = req.headers().get(header::COOKIE) {
        let cookie_str = cookie_header.to_str().map_err(|_| ApiError::InvalidToken)?;

        for cookie in cookie_str.split(';') {
            if let Some(token) = cookie.trim().strip_prefix("access_token=") {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::{jwt::encode_token, types::Claims};
    use axum::{http::StatusCode, routing::get, Extension, Router};
    use inkwell_common_core::UserId;
    use tower::ServiceExt;

    const SECRET: &str = "layer_test_secret_32_characters!";

    fn app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(user): Extension<AuthUser>| async move { user.id.to_string() }),
            )
            .layer(AuthLayer::new(SECRET))
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let req = Request::builder()
            .header("Authorization", "Bearer test_token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).unwrap(), "test_token");
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let req = Request::builder()
            .header("Cookie", "other=value; access_token=test_token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&req).unwrap(), "test_token");
    }

    #[test]
    fn test_extract_token_missing() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert!(matches!(extract_token(&req), Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let claims = Claims::new_access(UserId::new(5), "x@example.com", vec![], 600);
        let token = encode_token(&claims, SECRET).unwrap();

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_and_forged_tokens_are_401() {
        let response = app()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let claims = Claims::new_access(UserId::new(5), "x@example.com", vec![], 600);
        let forged = encode_token(&claims, "some_other_secret_32_characters!").unwrap();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {forged}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
