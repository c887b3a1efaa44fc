pub mod error;
pub mod lifecycle;
pub mod listing;
pub mod reconcile;
