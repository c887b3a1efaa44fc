//! Caller-trust middleware.
//!
//! Every route (except health and the API docs) requires the `X-Service-Key`
//! header to match the configured internal key. The platform's edge gateway
//! holds the key, so any request that reaches a handler comes from a trusted
//! caller.

use crate::transport::http::types::{AppState, ErrorResponse};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub const SERVICE_KEY_HEADER: &str = "X-Service-Key";

pub async fn require_service_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(SERVICE_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(key) if key == state.service_key.as_str() => next.run(request).await,
        _ => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: format!("Missing or invalid required header: {}", SERVICE_KEY_HEADER),
            }),
        )
            .into_response(),
    }
}
