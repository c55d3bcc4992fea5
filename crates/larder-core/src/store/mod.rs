//! Durable storage for the menu catalog.

pub mod error;
pub mod menu;

pub use error::StoreError;
pub use menu::MenuStore;
