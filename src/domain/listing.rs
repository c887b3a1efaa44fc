//! Core data model: listings and their image collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a listing.
///
/// `Published` is the initial state and the only one in which content edits
/// are allowed. `InAuction` and `Sold` are set by the auction service through
/// the internal status routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Published,
    InAuction,
    Sold,
}

impl ListingStatus {
    /// Content edits are only legal while the listing is still published.
    pub fn is_editable(self) -> bool {
        matches!(self, ListingStatus::Published)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Published => "PUBLISHED",
            ListingStatus::InAuction => "IN_AUCTION",
            ListingStatus::Sold => "SOLD",
        }
    }
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Published
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = anyhow::Error;

    /// Accepts both the stored form (`IN_AUCTION`) and the route-segment
    /// form (`in_auction`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLISHED" => Ok(ListingStatus::Published),
            "IN_AUCTION" => Ok(ListingStatus::InAuction),
            "SOLD" => Ok(ListingStatus::Sold),
            other => Err(anyhow::anyhow!("unknown listing status: {}", other)),
        }
    }
}

/// Language of the boxed game (rules + components).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    En,
    Lv,
    Ru,
    De,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Lv => "LV",
            Language::Ru => "RU",
            Language::De => "DE",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EN" => Ok(Language::En),
            "LV" => Ok(Language::Lv),
            "RU" => Ok(Language::Ru),
            "DE" => Ok(Language::De),
            other => Err(anyhow::anyhow!("unknown language: {}", other)),
        }
    }
}

/// One photo of the physical copy being listed.
///
/// `listing_id` is an informational back-reference to the owning listing, not
/// an ownership edge; the listing exclusively owns its images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingImage {
    /// Assigned by the store on first persist; `None` until then.
    pub id: Option<i64>,
    pub url: String,
    pub listing_id: Option<i64>,
}

impl ListingImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { id: None, url: url.into(), listing_id: None }
    }
}

/// A board-game auction listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// Assigned by the store on first persist; immutable thereafter.
    pub id: Option<i64>,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub condition: String,
    pub language: Language,
    pub min_players: i32,
    pub max_players: i32,
    pub status: ListingStatus,
    /// Stamped by the store at insert; never changed by updates.
    pub created_at: Option<DateTime<Utc>>,
    pub images: Vec<ListingImage>,
}

impl Listing {
    /// Replaces the image collection, stamping the back-reference on every
    /// image so the invariant "image.listing_id == listing.id" holds.
    pub fn set_images(&mut self, images: Vec<ListingImage>) {
        self.images = images;
        self.attach_images();
    }

    /// Re-stamps the back-reference on the current image collection.
    pub fn attach_images(&mut self) {
        let id = self.id;
        for image in &mut self.images {
            image.listing_id = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [ListingStatus::Published, ListingStatus::InAuction, ListingStatus::Sold] {
            assert_eq!(status.as_str().parse::<ListingStatus>().unwrap(), status);
        }
        // Route segments arrive lower-case.
        assert_eq!("in_auction".parse::<ListingStatus>().unwrap(), ListingStatus::InAuction);
        assert!("AUCTIONED".parse::<ListingStatus>().is_err());
    }

    #[test]
    fn only_published_is_editable() {
        assert!(ListingStatus::Published.is_editable());
        assert!(!ListingStatus::InAuction.is_editable());
        assert!(!ListingStatus::Sold.is_editable());
    }

    #[test]
    fn set_images_stamps_back_references() {
        let mut listing = Listing {
            id: Some(7),
            owner_id: 1,
            title: "Brass".to_string(),
            description: "Economic strategy game".to_string(),
            condition: "Like new".to_string(),
            language: Language::default(),
            min_players: 2,
            max_players: 4,
            status: ListingStatus::default(),
            created_at: None,
            images: Vec::new(),
        };
        listing.set_images(vec![ListingImage::new("https://img.example/a.jpg")]);
        assert_eq!(listing.images[0].listing_id, Some(7));
    }
}
