//! # Vigil API
//!
//! HTTP layer for Vigil.
//!
//! ## Endpoints
//!
//! - `POST /validate` - Password policy verdict: `{"password": "..."}` -> `{"secure": bool}`
//! - `GET /v1/sys/health` - Liveness

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use vigil_policy::PasswordPolicy;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared handler state.
///
/// The policy is immutable, so concurrent requests share it without locks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Password policy applied by `/validate`.
    pub policy: Arc<PasswordPolicy>,
}

impl AppState {
    /// Creates the state for `policy`.
    pub fn new(policy: PasswordPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

/// Builds the API router.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let routes = Router::new()
        .route("/validate", post(handlers::validate_password))
        .route("/v1/sys/health", get(handlers::health))
        .with_state(state);

    with_layers(routes, request_timeout)
}

/// Request timeout and tracing shared by every route.
fn with_layers(routes: Router, request_timeout: Duration) -> Router {
    routes
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(map_response(timeout_body))
        .layer(TraceLayer::new_for_http())
}

// The timeout layer answers with an empty body.
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::Timeout.into_response();
    }
    response
}
