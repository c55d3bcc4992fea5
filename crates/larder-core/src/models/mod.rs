//! Data models for the menu catalog.
//!
//! - `MenuItem`: a persisted catalog record with its store-assigned id
//! - `NewMenuItem`: a normalized record that has not been persisted yet

pub mod menu;

pub use menu::{MenuItem, NewMenuItem};
