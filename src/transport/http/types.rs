use crate::app::listing_service::ListingService;
use crate::domain::error::ServiceError;
use crate::domain::listing::{Language, Listing, ListingImage, ListingStatus};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ListingService>,
    /// Shared secret checked by the service-key middleware.
    pub service_key: Arc<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wire shape of a listing (camelCase, images inline).
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub condition: String,
    #[serde(default)]
    pub language: Language,
    pub min_players: i32,
    pub max_players: i32,
    /// Ignored on create and content update; the lifecycle owns this field.
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub images: Vec<ListingImageDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingImageDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub url: String,
}

impl ListingDto {
    /// Boundary validation; the core assumes validated input.
    pub fn validate(&self) -> Result<(), String> {
        if self.owner_id < 1 {
            return Err("ownerId must be positive".to_string());
        }
        if self.title.trim().len() < 2 {
            return Err("title must be at least 2 characters".to_string());
        }
        if self.description.trim().len() < 5 {
            return Err("description must be at least 5 characters".to_string());
        }
        if self.condition.trim().len() < 5 {
            return Err("condition must be at least 5 characters".to_string());
        }
        if self.min_players < 1 || self.max_players < 1 {
            return Err("minPlayers and maxPlayers must be positive".to_string());
        }
        for image in &self.images {
            if !image.url.starts_with("http://") && !image.url.starts_with("https://") {
                return Err(format!("image url is not a valid URL: {}", image.url));
            }
        }
        Ok(())
    }

    /// Create-specific rules: identity is assigned by the store, so neither
    /// the listing nor any image may arrive with an id.
    pub fn validate_for_create(&self) -> Result<(), String> {
        if self.id.is_some() {
            return Err("Id must be null".to_string());
        }
        if self.images.iter().any(|i| i.id.is_some()) {
            return Err("Image ids must be null".to_string());
        }
        self.validate()
    }

    pub fn into_domain(self) -> Listing {
        Listing {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            condition: self.condition,
            language: self.language,
            min_players: self.min_players,
            max_players: self.max_players,
            status: self.status.unwrap_or_default(),
            created_at: self.created_at,
            images: self
                .images
                .into_iter()
                .map(|i| ListingImage { id: i.id, url: i.url, listing_id: None })
                .collect(),
        }
    }

    pub fn from_domain(listing: Listing) -> Self {
        Self {
            id: listing.id,
            owner_id: listing.owner_id,
            title: listing.title,
            description: listing.description,
            condition: listing.condition,
            language: listing.language,
            min_players: listing.min_players,
            max_players: listing.max_players,
            status: Some(listing.status),
            created_at: listing.created_at,
            images: listing
                .images
                .into_iter()
                .map(|i| ListingImageDto { id: i.id, url: i.url })
                .collect(),
        }
    }
}

pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message.into() }))
}

/// Maps the service error taxonomy onto HTTP status signaling.
pub fn service_error_response(err: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict { .. } => StatusCode::CONFLICT,
        ServiceError::Store(cause) => {
            tracing::error!(error = %cause, "storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}
