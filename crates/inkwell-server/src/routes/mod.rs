//! Router assembly.

mod internal;
mod v1;

use crate::config::{CorsConfig, ServerConfig};
use crate::error::ApiError;
use crate::middleware::LoggingLayer;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    response::IntoResponse,
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};
use tracing::warn;

const REQUEST_ID: &str = "x-request-id";

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let common = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID)))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.cors))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(MapResponseBodyLayer::new(Body::new))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes));

    let mut router = Router::new()
        .nest("/api/v1", v1::router(&state))
        .nest("/internal", internal::router());

    if let Some(prefix) = storage_mount(&config) {
        router = router.nest_service(prefix, ServeDir::new(&config.storage.root));
    }

    router
        .fallback(fallback)
        .layer(LoggingLayer::new(&config.logging))
        .layer(common)
        .with_state(state)
}

/// Mount point for stored files, when the public URL is a local path.
fn storage_mount(config: &ServerConfig) -> Option<&str> {
    let url = config.storage.public_url.trim_end_matches('/');
    if url.starts_with('/') && url.len() > 1 {
        Some(url)
    } else {
        None
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age_secs));

    if config.allow_any_origin {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

async fn fallback() -> impl IntoResponse {
    ApiError::NotFound("Route")
}
