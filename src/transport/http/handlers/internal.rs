//! Service-to-service routes (auction service callbacks, account cleanup).
//!
//! These share the service-key check with the public routes but are only
//! routed to by other services, never by end users.

use crate::domain::listing::ListingStatus;
use crate::transport::http::types::{bad_request, service_error_response, AppState, ListingDto};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/internal/listing/{id}",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing found", body = ListingDto),
        (status = 404, description = "Listing not found", body = ErrorResponse)
    )
)]
pub async fn internal_get_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.service.find_by_id(id).await {
        Ok(listing) => (StatusCode::OK, Json(ListingDto::from_domain(listing))).into_response(),
        Err(e) => service_error_response(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/internal/listing/{id}/status/{target}",
    params(
        ("id" = i64, Path, description = "Listing id"),
        ("target" = String, Path, description = "Target status: published | in_auction | sold")
    ),
    responses(
        (status = 204, description = "Status changed"),
        (status = 400, description = "Unknown target status", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse)
    )
)]
pub async fn set_listing_status_handler(
    State(state): State<AppState>,
    Path((id, target)): Path<(i64, String)>,
) -> impl IntoResponse {
    // The administrative transition is unconditional; only the target has to
    // be a known status.
    let target: ListingStatus = match target.parse() {
        Ok(t) => t,
        Err(e) => return bad_request(e.to_string()).into_response(),
    };

    match state.service.set_status(id, target).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/internal/listing/{id}",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 404, description = "Listing not found", body = ErrorResponse)
    )
)]
pub async fn internal_delete_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response(e).into_response(),
    }
}
