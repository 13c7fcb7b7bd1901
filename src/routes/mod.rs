//! HTTP routes for hosting the handler as an invocation endpoint.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within an invocation.

pub mod health;
pub mod invoke;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Cache-Control for every response; invocations have side effects
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Creates the Axum router for the invocation endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/invoke", post(invoke::invoke))
        .route("/health", get(health::health))
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
