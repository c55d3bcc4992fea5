//! Debounced search over the local catalog.
//!
//! `Debouncer` defers query initiation until input settles; `SearchFeed`
//! layers request sequencing on top so a slow early query can never
//! overwrite a fast late one.

pub mod debounce;
pub mod feed;

pub use debounce::Debouncer;
pub use feed::{SearchFeed, SEARCH_DEBOUNCE_MS};
