//! Lifecycle gating for listing mutations.
//!
//! Two kinds of status change exist:
//! - the administrative transition (auction service callbacks), which is
//!   unconditional, and
//! - the content-edit gate, which only admits updates while the persisted
//!   status is still `PUBLISHED`.

use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::listing::{Listing, ListingStatus};

/// Fails with `Conflict` unless the persisted status still admits edits.
/// `id` is the persisted listing's id, reported in the conflict.
pub fn ensure_editable(id: i64, status: ListingStatus) -> ServiceResult<()> {
    if status.is_editable() {
        Ok(())
    } else {
        Err(ServiceError::Conflict { id, status })
    }
}

/// Administrative transition: any state to any state, always legal.
pub fn transition(listing: &mut Listing, target: ListingStatus) {
    listing.status = target;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::Language;

    fn listing_with(status: ListingStatus) -> Listing {
        Listing {
            id: Some(5),
            owner_id: 1,
            title: "Root".to_string(),
            description: "Asymmetric woodland warfare".to_string(),
            condition: "Played twice".to_string(),
            language: Language::default(),
            min_players: 2,
            max_players: 4,
            status,
            created_at: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn published_passes_the_edit_gate() {
        assert!(ensure_editable(5, ListingStatus::Published).is_ok());
    }

    #[test]
    fn non_published_fails_conflict_with_context() {
        for status in [ListingStatus::InAuction, ListingStatus::Sold] {
            match ensure_editable(5, status) {
                Err(ServiceError::Conflict { id, status: got }) => {
                    assert_eq!(id, 5);
                    assert_eq!(got, status);
                }
                other => panic!("expected Conflict, got {:?}", other),
            }
        }
    }

    #[test]
    fn administrative_transition_is_unconditional() {
        // Including "backwards" moves like SOLD -> PUBLISHED.
        let mut listing = listing_with(ListingStatus::Sold);
        transition(&mut listing, ListingStatus::Published);
        assert_eq!(listing.status, ListingStatus::Published);
    }
}
