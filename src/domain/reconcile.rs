//! Image-set reconciliation.
//!
//! An update submits the full desired image list, but images that were already
//! persisted must keep their database identity. Reconciliation merges the
//! submitted list against the persisted one by URL: unchanged URLs retain the
//! persisted row, new URLs become fresh rows, and URLs missing from the
//! submission are dropped.

use crate::domain::listing::{Listing, ListingImage};

/// Merges `existing` (persisted, ids non-null) with `proposed` (submitted,
/// ids null or stale) and returns the final set to persist, back-references
/// already stamped for `owner`.
///
/// The result order is brand-new images first, then the retained existing
/// ones, and is part of the persisted outcome.
///
/// URL matching is exact string equality. Duplicate URLs inside `proposed`
/// are only deduplicated against `existing`, not against each other.
pub fn reconcile_images(
    owner: &Listing,
    existing: &[ListingImage],
    proposed: Vec<ListingImage>,
) -> Vec<ListingImage> {
    // Existing images keep their identity iff the submission still wants
    // their URL.
    let kept: Vec<ListingImage> = existing
        .iter()
        .filter(|old| proposed.iter().any(|new| new.url == old.url))
        .cloned()
        .collect();

    // Submissions matching a persisted URL are dropped: the persisted
    // identity wins, never the new one.
    let brand_new = proposed
        .into_iter()
        .filter(|new| !existing.iter().any(|old| old.url == new.url))
        .map(|mut image| {
            // Fresh URL means fresh identity; any submitted id is stale and
            // the store assigns the real one.
            image.id = None;
            image
        });

    let mut merged: Vec<ListingImage> = brand_new.chain(kept).collect();
    for image in &mut merged {
        image.listing_id = owner.id;
    }
    merged
}
