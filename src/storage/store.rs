//! Durable keyed storage for listings and their image sub-records.

use crate::domain::listing::{Listing, ListingStatus};
use async_trait::async_trait;

/// Outcome of a status-guarded save.
#[derive(Debug)]
pub enum CheckedSave {
    Saved(Listing),
    /// The listing no longer exists.
    Missing,
    /// The persisted status no longer matches the expected one; carries the
    /// status found under the lock.
    StatusChanged(ListingStatus),
}

/// Storage contract the service operates against.
///
/// `save` is an upsert: inserting assigns `id`/`created_at` (and image ids),
/// updating replaces the listing row and reconciles the image rows to exactly
/// the supplied set — new images inserted, matching ids kept, orphans
/// deleted — inside a single transaction.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Loads one listing with its images eagerly, in persisted order.
    async fn get(&self, id: i64) -> anyhow::Result<Option<Listing>>;

    async fn exists(&self, id: i64) -> anyhow::Result<bool>;

    async fn find_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<Listing>>;

    async fn save(&self, listing: Listing) -> anyhow::Result<Listing>;

    /// Update-only save that re-verifies the persisted status under the same
    /// transaction (row lock) before writing, so a concurrent administrative
    /// transition cannot be overwritten by a content update that loaded a
    /// stale snapshot.
    async fn save_if_status(
        &self,
        listing: Listing,
        expected: ListingStatus,
    ) -> anyhow::Result<CheckedSave>;

    /// Atomically sets the status of one listing in a single unit of work.
    /// Returns the stored listing, or `None` when it does not exist.
    async fn update_status(
        &self,
        id: i64,
        target: ListingStatus,
    ) -> anyhow::Result<Option<Listing>>;

    /// Removes the listing and cascades removal of its images.
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()>;

    /// Removes all of the owner's listings and their images. No-op when the
    /// owner has none.
    async fn delete_by_owner(&self, owner_id: i64) -> anyhow::Result<()>;
}
