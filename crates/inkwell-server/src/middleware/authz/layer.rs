//! Route-level authorization layer.

use super::audit::log_authz;
use crate::error::ApiError;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use inkwell_policy::{authorize, Action, Actor, Ownership, ResourceKind};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

/// Requires the blanket permission `action` on `resource` before the route
/// runs. Must sit inside the actor resolution middleware.
#[derive(Clone, Copy)]
pub struct AuthzLayer {
    action: Action,
    resource: ResourceKind,
}

impl AuthzLayer {
    pub fn new(action: Action, resource: ResourceKind) -> Self {
        Self { action, resource }
    }

    pub fn view(resource: ResourceKind) -> Self {
        Self::new(Action::View, resource)
    }

    pub fn manage(resource: ResourceKind) -> Self {
        Self::new(Action::Manage, resource)
    }
}

impl<S> Layer<S> for AuthzLayer {
    type Service = AuthzMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthzMiddleware {
            inner,
            action: self.action,
            resource: self.resource,
        }
    }
}

#[derive(Clone)]
pub struct AuthzMiddleware<S> {
    inner: S,
    action: Action,
    resource: ResourceKind,
}

impl<S> Service<Request<Body>> for AuthzMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let action = self.action;
        let resource = self.resource;
        let outcome = match req.extensions().get::<Actor>() {
            None => {
                warn!("Authorization check without a resolved actor");
                Err(ApiError::Unauthorized)
            }
            Some(actor) => match authorize(actor, action, resource, Ownership::NotApplicable) {
                Ok(_) => {
                    log_authz(actor, action, resource, None, Ok(()));
                    Ok(())
                }
                Err(denied) => {
                    log_authz(actor, action, resource, None, Err(&denied));
                    Err(ApiError::from(denied))
                }
            },
        };

        let mut inner = self.inner.clone();
        Box::pin(async move {
            match outcome {
                Ok(()) => inner.call(req).await,
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Extension, Router};
    use inkwell_domain::UserId;
    use inkwell_policy::{RoleRegistry, ADMIN_ROLE, GUEST_ROLE};
    use tower::ServiceExt;

    fn app(actor: Option<Actor>) -> Router {
        let router = Router::new()
            .route("/roles", get(|| async { "ok" }))
            .layer(AuthzLayer::manage(ResourceKind::Roles));
        match actor {
            Some(actor) => router.layer(Extension(actor)),
            None => router,
        }
    }

    fn actor(role: &str) -> Actor {
        RoleRegistry::seeded().resolve(UserId::new(1), vec![role.into()], None)
    }

    async fn status(app: Router) -> StatusCode {
        app.oneshot(Request::get("/roles").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_granted_passes_through() {
        assert_eq!(status(app(Some(actor(ADMIN_ROLE)))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_denied_is_forbidden() {
        assert_eq!(status(app(Some(actor(GUEST_ROLE)))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_actor_is_unauthorized() {
        assert_eq!(status(app(None)).await, StatusCode::UNAUTHORIZED);
    }
}
