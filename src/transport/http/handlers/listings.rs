//! Owner-facing listing routes (reached through the platform gateway).

use crate::transport::http::types::{bad_request, service_error_response, AppState, ListingDto};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/listing/{id}",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing found", body = ListingDto),
        (status = 404, description = "Listing not found", body = ErrorResponse)
    )
)]
pub async fn get_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.service.find_by_id(id).await {
        Ok(listing) => (StatusCode::OK, Json(ListingDto::from_domain(listing))).into_response(),
        Err(e) => service_error_response(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/listing/user/{owner_id}",
    params(("owner_id" = i64, Path, description = "Owner (user) id")),
    responses(
        (status = 200, description = "Listings of the owner (possibly empty)", body = Vec<ListingDto>)
    )
)]
pub async fn get_listings_by_owner_handler(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> impl IntoResponse {
    match state.service.find_by_owner(owner_id).await {
        Ok(listings) => {
            let dtos: Vec<ListingDto> = listings.into_iter().map(ListingDto::from_domain).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => service_error_response(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/listing",
    request_body = ListingDto,
    responses(
        (status = 201, description = "Listing created", body = ListingDto),
        (status = 400, description = "Invalid submission", body = ErrorResponse)
    )
)]
pub async fn create_listing_handler(
    State(state): State<AppState>,
    request: Result<Json<ListingDto>, JsonRejection>,
) -> impl IntoResponse {
    let Json(dto) = match request {
        Ok(v) => v,
        Err(e) => return bad_request(format!("Invalid JSON body: {}", e)).into_response(),
    };
    if let Err(msg) = dto.validate_for_create() {
        return bad_request(msg).into_response();
    }

    match state.service.create(dto.into_domain()).await {
        Ok(created) => {
            (StatusCode::CREATED, Json(ListingDto::from_domain(created))).into_response()
        }
        Err(e) => service_error_response(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/listing/{id}",
    params(("id" = i64, Path, description = "Listing id")),
    request_body = ListingDto,
    responses(
        (status = 204, description = "Listing updated"),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
        (status = 409, description = "Listing is not editable in its current status", body = ErrorResponse)
    )
)]
pub async fn update_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Result<Json<ListingDto>, JsonRejection>,
) -> impl IntoResponse {
    let Json(dto) = match request {
        Ok(v) => v,
        Err(e) => return bad_request(format!("Invalid JSON body: {}", e)).into_response(),
    };
    if id < 1 || dto.id != Some(id) {
        return bad_request("Path id and body id must match").into_response();
    }
    if let Err(msg) = dto.validate() {
        return bad_request(msg).into_response();
    }

    match state.service.update(dto.into_domain()).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/listing/{id}",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 404, description = "Listing not found", body = ErrorResponse)
    )
)]
pub async fn delete_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/listing/user/{owner_id}",
    params(("owner_id" = i64, Path, description = "Owner (user) id")),
    responses(
        (status = 204, description = "All listings of the owner deleted (no-op if none)")
    )
)]
pub async fn delete_listings_by_owner_handler(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> impl IntoResponse {
    match state.service.delete_all_by_owner(owner_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response(e).into_response(),
    }
}
