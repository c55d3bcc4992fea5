//! HTTP client for the canonical menu catalog.
//!
//! The catalog is a single JSON document. Entries arrive with bare image
//! filenames and display-cased categories; they are normalized here so that
//! everything downstream can rely on the canonical form.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::models::NewMenuItem;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Canonical catalog document.
const CATALOG_URL: &str =
    "https://raw.githubusercontent.com/Meta-Mobile-Developer-PC/Working-With-Data-API/main/capstone.json";

/// Prefix for rewriting bare image filenames into fetchable URLs.
const IMAGE_BASE_URL: &str =
    "https://github.com/Meta-Mobile-Developer-PC/Working-With-Data-API/blob/main/images";

/// Suffix that makes the rewritten image URL serve the raw file.
const IMAGE_URL_SUFFIX: &str = "?raw=true";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A source of normalized catalog entries.
///
/// The sync orchestrator is generic over this so it can be driven by a
/// scripted source in tests instead of the network.
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<NewMenuItem>, ApiError>> + Send;
}

/// Raw catalog entry as it appears in the remote document.
#[derive(Debug, Clone, Deserialize)]
struct RawMenuItem {
    name: String,
    price: f64,
    description: String,
    /// Bare image filename, e.g. "greekSalad.jpg".
    image: String,
    category: String,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    menu: Vec<RawMenuItem>,
}

impl RawMenuItem {
    /// Rewrite the image reference into a fully-qualified URL and lowercase
    /// the category so later comparisons need no further normalization.
    fn normalize(self) -> NewMenuItem {
        NewMenuItem {
            name: self.name,
            price: self.price,
            description: self.description,
            image: format!("{IMAGE_BASE_URL}/{}{IMAGE_URL_SUFFIX}", self.image),
            category: self.category.to_lowercase(),
        }
    }
}

/// Client for the remote menu catalog.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    url: String,
}

impl CatalogClient {
    /// Create a client pointed at the canonical catalog document.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_url(CATALOG_URL)
    }

    /// Create a client pointed at an alternate document URL.
    pub fn with_url(url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl CatalogSource for CatalogClient {
    /// Fetch the catalog document and return its entries, normalized.
    /// No retry happens here; failures go straight back to the caller.
    async fn fetch_catalog(&self) -> Result<Vec<NewMenuItem>, ApiError> {
        debug!(url = %self.url, "fetching catalog document");

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        // Read the body as text first so a structurally invalid document is
        // reported as a parse failure, not a transport one.
        let body = response.text().await?;
        let document: CatalogDocument = serde_json::from_str(&body)?;

        info!(count = document.menu.len(), "catalog document fetched");
        Ok(document
            .menu
            .into_iter()
            .map(RawMenuItem::normalize)
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DOCUMENT: &str = r#"{
        "menu": [
            {
                "name": "Greek Salad",
                "price": 12.99,
                "description": "Crispy lettuce, peppers, olives and feta.",
                "image": "greekSalad.jpg",
                "category": "Starters"
            },
            {
                "name": "Lemon Dessert",
                "price": 4.99,
                "description": "Straight from grandma's recipe book.",
                "image": "lemonDessert.jpg",
                "category": "Desserts"
            }
        ]
    }"#;

    #[test]
    fn normalize_rewrites_image_and_lowercases_category() {
        let raw = RawMenuItem {
            name: "Lemon Dessert".into(),
            price: 4.99,
            description: String::new(),
            image: "lemonDessert.jpg".into(),
            category: "Desserts".into(),
        };
        let item = raw.normalize();
        assert_eq!(
            item.image,
            "https://github.com/Meta-Mobile-Developer-PC/Working-With-Data-API/blob/main/images/lemonDessert.jpg?raw=true"
        );
        assert_eq!(item.category, "desserts");
        assert_eq!(item.name, "Lemon Dessert");
    }

    #[test]
    fn parses_the_catalog_document() {
        let document: CatalogDocument = serde_json::from_str(SAMPLE_DOCUMENT).unwrap();
        assert_eq!(document.menu.len(), 2);
        assert_eq!(document.menu[0].name, "Greek Salad");
        assert_eq!(document.menu[1].price, 4.99);
    }

    #[test]
    fn structurally_invalid_document_is_a_parse_error() {
        let err = serde_json::from_str::<CatalogDocument>(r#"{"menu": 12}"#).unwrap_err();
        assert!(matches!(ApiError::from(err), ApiError::Parse(_)));
    }
}
