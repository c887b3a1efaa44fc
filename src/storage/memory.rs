//! Hashmap-backed store used by unit and router tests.
//!
//! Mirrors the Postgres semantics: monotonic id assignment for listings and
//! images, `created_at` stamped once at insert, image set replaced wholesale
//! on update (orphan removal comes for free).

use crate::domain::lifecycle;
use crate::domain::listing::{Listing, ListingStatus};
use crate::storage::store::{CheckedSave, ListingStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    listings: BTreeMap<i64, Listing>,
    next_listing_id: i64,
    next_image_id: i64,
}

#[derive(Default)]
pub struct InMemoryListingStore {
    inner: Mutex<Inner>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored listings; lets tests assert "store unchanged".
    pub async fn len(&self) -> usize {
        self.inner.lock().await.listings.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn get(&self, id: i64) -> anyhow::Result<Option<Listing>> {
        Ok(self.inner.lock().await.listings.get(&id).cloned())
    }

    async fn exists(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.lock().await.listings.contains_key(&id))
    }

    async fn find_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<Listing>> {
        Ok(self
            .inner
            .lock()
            .await
            .listings
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn save(&self, mut listing: Listing) -> anyhow::Result<Listing> {
        let mut inner = self.inner.lock().await;

        let id = match listing.id {
            Some(id) => {
                let previous = inner
                    .listings
                    .get(&id)
                    .ok_or_else(|| anyhow::anyhow!("update of unknown listing id {}", id))?;
                listing.created_at = previous.created_at;
                id
            }
            None => {
                inner.next_listing_id += 1;
                let id = inner.next_listing_id;
                listing.id = Some(id);
                listing.created_at = Some(Utc::now());
                id
            }
        };

        for image in &mut listing.images {
            if image.id.is_none() {
                inner.next_image_id += 1;
                image.id = Some(inner.next_image_id);
            }
            image.listing_id = Some(id);
        }

        inner.listings.insert(id, listing.clone());
        Ok(listing)
    }

    async fn save_if_status(
        &self,
        mut listing: Listing,
        expected: ListingStatus,
    ) -> anyhow::Result<CheckedSave> {
        // One lock across the check and the write.
        let mut inner = self.inner.lock().await;

        let id = listing
            .id
            .ok_or_else(|| anyhow::anyhow!("guarded save requires a listing id"))?;
        let (current, created_at) = match inner.listings.get(&id) {
            Some(stored) => (stored.status, stored.created_at),
            None => return Ok(CheckedSave::Missing),
        };
        if current != expected {
            return Ok(CheckedSave::StatusChanged(current));
        }

        listing.created_at = created_at;
        for image in &mut listing.images {
            if image.id.is_none() {
                inner.next_image_id += 1;
                image.id = Some(inner.next_image_id);
            }
            image.listing_id = Some(id);
        }

        inner.listings.insert(id, listing.clone());
        Ok(CheckedSave::Saved(listing))
    }

    async fn update_status(
        &self,
        id: i64,
        target: ListingStatus,
    ) -> anyhow::Result<Option<Listing>> {
        let mut inner = self.inner.lock().await;
        match inner.listings.get_mut(&id) {
            Some(stored) => {
                lifecycle::transition(stored, target);
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        self.inner.lock().await.listings.remove(&id);
        Ok(())
    }

    async fn delete_by_owner(&self, owner_id: i64) -> anyhow::Result<()> {
        self.inner.lock().await.listings.retain(|_, l| l.owner_id != owner_id);
        Ok(())
    }
}
