use crate::transport::http::handlers::{health, internal, listings};
use crate::transport::http::middleware::require_service_key;
use crate::transport::http::types::{AppState, ErrorResponse, ListingDto, ListingImageDto};
use axum::routing::{get, post, put};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        listings::get_listing_handler,
        listings::get_listings_by_owner_handler,
        listings::create_listing_handler,
        listings::update_listing_handler,
        listings::delete_listing_handler,
        listings::delete_listings_by_owner_handler,
        internal::internal_get_listing_handler,
        internal::set_listing_status_handler,
        internal::internal_delete_listing_handler
    ),
    components(schemas(
        ListingDto,
        ListingImageDto,
        ErrorResponse,
        crate::domain::listing::ListingStatus,
        crate::domain::listing::Language
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let guarded = Router::new()
        .route("/listing", post(listings::create_listing_handler))
        .route(
            "/listing/:id",
            get(listings::get_listing_handler)
                .put(listings::update_listing_handler)
                .delete(listings::delete_listing_handler),
        )
        .route(
            "/listing/user/:owner_id",
            get(listings::get_listings_by_owner_handler)
                .delete(listings::delete_listings_by_owner_handler),
        )
        .route(
            "/internal/listing/:id",
            get(internal::internal_get_listing_handler)
                .delete(internal::internal_delete_listing_handler),
        )
        .route(
            "/internal/listing/:id/status/:target",
            put(internal::set_listing_status_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_service_key,
        ));

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .merge(guarded)
        .with_state(app_state)
}
