pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::listing_service::ListingService;
pub use domain::error::{ServiceError, ServiceResult};
pub use domain::listing::{Language, Listing, ListingImage, ListingStatus};
pub use storage::memory::InMemoryListingStore;
pub use storage::postgres::PgListingStore;
pub use storage::store::ListingStore;
