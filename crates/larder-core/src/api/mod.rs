//! Remote catalog access.
//!
//! `CatalogClient` fetches and normalizes the canonical menu document;
//! `CatalogSource` is the seam the sync orchestrator consumes, so tests can
//! substitute a scripted source for the network.

pub mod client;
pub mod error;

pub use client::{CatalogClient, CatalogSource};
pub use error::ApiError;
