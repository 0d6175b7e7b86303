//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::error::hide_internal_errors;
use crate::handlers::health;
use crate::handlers::posts::{create_post, list_posts};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
///
/// Anything not matched by an API route is served from the static
/// directory, with `index.html` answering unknown paths.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    hide_internal_errors(state.config.is_production());

    // Only publishing is rate limited, and only when a limit is configured
    let publish = match state.config.rate_limit_rps {
        0 => post(create_post),
        rps => {
            let rate_limiter = Arc::new(RateLimiterCache::new(rps));
            post(create_post).layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware))
        }
    };
    let api_routes = Router::new().route("/community-posts", get(list_posts).merge(publish));

    let health_routes = Router::new().route("/health", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    let static_dir = &state.config.static_dir;
    let static_files = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .fallback_service(static_files)
        // The body limit layer below is the only cap
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
