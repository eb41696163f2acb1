//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the production binary (`main.rs`)
//! and integration tests (`tests/common/mod.rs`) use the exact same middleware
//! stack.

use std::time::Duration;

use axum::extract::Request;
use axum::http::{HeaderName, StatusCode};
use axum::Router;
use tower::util::MapRequest;
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::middleware::method_override::method_override;
use crate::routes;
use crate::state::AppState;
use crate::storage::UPLOADS_URL_PREFIX;

/// The complete application: the router wrapped in the `_method` override.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Build the full application with all middleware layers.
///
/// The middleware stack is applied bottom-up:
///
/// 1. Set request ID on incoming requests
/// 2. Structured request/response tracing
/// 3. Propagate request ID to response
/// 4. Request timeout
/// 5. Panic recovery (catch panics, return 500)
///
/// The method override wraps the router itself because routing has already
/// happened by the time a `Router::layer` middleware runs.
pub fn build_app_router(state: AppState) -> App {
    let config = state.config.clone();
    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        // Health check at root level (not under /admin).
        .merge(routes::health::router())
        .merge(routes::root_redirect())
        // Admin pages.
        .nest("/admin", routes::admin_routes(config.upload_body_limit()))
        // Stored images, read-only.
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(state.images.root()))
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid,
        ))
        // Shared state.
        .with_state(state);

    tower::util::MapRequestLayer::new(method_override as fn(Request) -> Request).layer(router)
}
