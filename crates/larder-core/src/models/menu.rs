use serde::{Deserialize, Serialize};

/// A persisted catalog entry.
///
/// Ids are assigned by the store on insert, increase monotonically and are
/// never reused while the record exists. The category is already in its
/// canonical lowercase form by the time a record is stored, so comparisons
/// against it need no further normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// May be empty, but is always present.
    pub description: String,
    /// Fully-qualified image URL.
    pub image: String,
    /// Canonical lowercase category, normalized at hydration.
    pub category: String,
}

/// A catalog entry that has not been persisted yet - the hydrator's output
/// and the store's insert input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub category: String,
}
