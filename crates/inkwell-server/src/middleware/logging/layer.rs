//! Request logging middleware.

use crate::config::LoggingConfig;
use axum::{body::Body, extract::Request, http::Response};
use futures::future::BoxFuture;
use std::{
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Logs `request_started` and `request_completed` for every request whose
/// path is not excluded.
#[derive(Clone)]
pub struct LoggingLayer {
    exclude_paths: Arc<Vec<String>>,
    enabled: bool,
}

impl LoggingLayer {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            exclude_paths: Arc::new(config.exclude_paths.clone()),
            enabled: config.log_requests,
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware {
            inner,
            exclude_paths: self.exclude_paths.clone(),
            enabled: self.enabled,
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
    exclude_paths: Arc<Vec<String>>,
    enabled: bool,
}

impl<S> LoggingMiddleware<S> {
    fn skips(&self, path: &str) -> bool {
        !self.enabled || self.exclude_paths.iter().any(|p| path.starts_with(p.as_str()))
    }
}

impl<S> Service<Request> for LoggingMiddleware<S>
where
    S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let mut inner = self.inner.clone();

        if self.skips(req.uri().path()) {
            return Box::pin(async move { inner.call(req).await });
        }

        let method = req.method().clone();
        let uri = req.uri().clone();
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let client_ip = req
            .headers()
            .get("x-forwarded-for")
            .or_else(|| req.headers().get("x-real-ip"))
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_default();

        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            path = %uri.path(),
            client_ip = %client_ip,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                info!(
                    event = "request_started",
                    uri = %uri,
                    user_agent = %user_agent,
                );

                let response = inner.call(req).await?;

                let status = response.status();
                let duration_ms = start.elapsed().as_millis() as u64;
                if status.is_server_error() {
                    warn!(event = "request_completed", status = status.as_u16(), duration_ms);
                } else {
                    info!(event = "request_completed", status = status.as_u16(), duration_ms);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    fn config(exclude: &[&str]) -> LoggingConfig {
        LoggingConfig {
            level: "info".into(),
            format: "pretty".into(),
            log_requests: true,
            exclude_paths: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_excluded_paths_are_skipped() {
        let layer = LoggingLayer::new(&config(&["/internal/health"]));
        let service = layer.layer(());
        assert!(service.skips("/internal/health/live"));
        assert!(!service.skips("/api/v1/posts"));
    }

    #[test]
    fn test_disabled_skips_everything() {
        let mut cfg = config(&[]);
        cfg.log_requests = false;
        let service = LoggingLayer::new(&cfg).layer(());
        assert!(service.skips("/api/v1/posts"));
    }

    #[tokio::test]
    async fn test_passes_response_through() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(LoggingLayer::new(&config(&[])));
        let response = app
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
