//! Error taxonomy for listing operations.
//!
//! Every failure carries enough context (the listing id, and for conflicts the
//! current status) for the caller to act on it. The HTTP layer maps these onto
//! status codes; nothing here knows about transports.

use crate::domain::listing::ListingStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Listing with id: {0} is not found")]
    NotFound(i64),

    #[error("Listing with id: {id} can't be updated because listing status is {status}, not PUBLISHED")]
    Conflict { id: i64, status: ListingStatus },

    /// Persistence failure. Terminal for the current operation; the store may
    /// retry transient transaction conflicts internally before surfacing this.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
