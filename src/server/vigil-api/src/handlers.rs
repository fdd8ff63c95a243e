//! Request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{ApiError, AppState};

/// Verdict returned by `POST /validate`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateResponse {
    /// Whether the password satisfies the policy.
    pub secure: bool,
}

/// Body of `GET /v1/sys/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// `POST /validate`
///
/// Reads `password` from a JSON object. A missing field is evaluated as the
/// empty string; a field of any other JSON type is rejected.
pub async fn validate_password(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(payload) = payload?;
    let password = extract_password(&payload)?;

    let secure = state.policy.evaluate(password);
    debug!(secure, "password evaluated");

    Ok(Json(ValidateResponse { secure }))
}

/// `GET /v1/sys/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn extract_password(payload: &Value) -> Result<&str, ApiError> {
    let object = payload.as_object().ok_or_else(|| {
        ApiError::InvalidInputType(format!(
            "request body must be a JSON object, got {}",
            type_name(payload)
        ))
    })?;

    match object.get("password") {
        None => Ok(""),
        Some(Value::String(password)) => Ok(password),
        Some(other) => Err(ApiError::InvalidInputType(format!(
            "password must be a string, got {}",
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
