//! The listing service.
//!
//! Orchestrates lookup, creation, update, status transitions and deletion
//! against a [`ListingStore`]. The lifecycle gate and image reconciliation
//! are pure domain computations; every public operation is one synchronous
//! round trip to the store, with multi-statement mutations made atomic by the
//! store's transaction in `save`.

use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::lifecycle;
use crate::domain::listing::{Listing, ListingStatus};
use crate::domain::reconcile::reconcile_images;
use crate::storage::store::{CheckedSave, ListingStore};
use std::sync::Arc;

pub struct ListingService {
    store: Arc<dyn ListingStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Listing> {
        self.store
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Empty vec when the owner has no listings; never a failure.
    pub async fn find_by_owner(&self, owner_id: i64) -> ServiceResult<Vec<Listing>> {
        Ok(self.store.find_by_owner(owner_id).await?)
    }

    /// Persists a new listing. The submitted status is ignored: creation
    /// always yields `PUBLISHED`.
    pub async fn create(&self, mut listing: Listing) -> ServiceResult<Listing> {
        listing.status = ListingStatus::Published;
        listing.attach_images();
        Ok(self.store.save(listing).await?)
    }

    /// Content update. Legal only while the persisted status is `PUBLISHED`;
    /// the submitted status and creation timestamp are always overridden with
    /// the persisted ones, and the image set is reconciled so unchanged URLs
    /// keep their persisted identity.
    pub async fn update(&self, mut listing: Listing) -> ServiceResult<Listing> {
        let id = listing
            .id
            .ok_or_else(|| anyhow::anyhow!("update requires a listing id"))?;
        let existing = self.find_by_id(id).await?;
        lifecycle::ensure_editable(id, existing.status)?;

        let proposed = std::mem::take(&mut listing.images);
        listing.images = reconcile_images(&listing, &existing.images, proposed);
        listing.status = existing.status;
        listing.created_at = existing.created_at;

        // The store re-verifies the status under its own lock, so an
        // administrative transition landing between our load and this save
        // surfaces as a conflict instead of being overwritten.
        match self.store.save_if_status(listing, existing.status).await? {
            CheckedSave::Saved(saved) => Ok(saved),
            CheckedSave::Missing => Err(ServiceError::NotFound(id)),
            CheckedSave::StatusChanged(status) => Err(ServiceError::Conflict { id, status }),
        }
    }

    /// Administrative status transition (auction service callbacks).
    /// Unconditional: succeeds for any current status as long as the listing
    /// exists. One atomic unit of work at the store.
    pub async fn set_status(&self, id: i64, target: ListingStatus) -> ServiceResult<Listing> {
        self.store
            .update_status(id, target)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.store.exists(id).await? {
            return Err(ServiceError::NotFound(id));
        }
        Ok(self.store.delete_by_id(id).await?)
    }

    /// Succeeds as a no-op when the owner has no listings.
    pub async fn delete_all_by_owner(&self, owner_id: i64) -> ServiceResult<()> {
        Ok(self.store.delete_by_owner(owner_id).await?)
    }
}
