//! Application root.
//!
//! `App` owns the core services (config, store, sync, profile) and is
//! created once by the process root, then passed by reference to whatever
//! front end drives it. There is no ambient global state.

use anyhow::{Context, Result};
use tracing::info;

use crate::api::{CatalogClient, CatalogSource};
use crate::config::Config;
use crate::models::MenuItem;
use crate::profile::ProfileStore;
use crate::store::MenuStore;
use crate::sync::{CatalogSync, SyncError};

/// Database file name in the data directory
const DB_FILE: &str = "menu.db";

pub struct App<S = CatalogClient> {
    pub config: Config,
    sync: CatalogSync<S>,
    profile: ProfileStore,
}

impl App<CatalogClient> {
    /// Wire the standard production components from `config`.
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let store =
            MenuStore::open(data_dir.join(DB_FILE)).context("failed to open menu database")?;
        let client = match config.catalog_url {
            Some(ref url) => CatalogClient::with_url(url.clone()),
            None => CatalogClient::new(),
        }
        .context("failed to build catalog client")?;
        let profile = ProfileStore::new(data_dir);
        Ok(Self::with_components(config, store, client, profile))
    }
}

impl<S: CatalogSource + 'static> App<S> {
    /// Assemble an application root from explicit components.
    pub fn with_components(
        config: Config,
        store: MenuStore,
        source: S,
        profile: ProfileStore,
    ) -> Self {
        Self {
            config,
            sync: CatalogSync::new(store, source),
            profile,
        }
    }

    /// The populated catalog, hydrating it first if the local store is
    /// empty.
    pub async fn load_menu(&self) -> Result<Vec<MenuItem>, SyncError> {
        self.sync.ensure_populated().await
    }

    pub fn store(&self) -> &MenuStore {
        self.sync.store()
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    /// Clear the menu catalog and all locally saved application state as
    /// one combined operation. The first failure is reported; there is no
    /// partial-reset promise.
    pub async fn reset(&self) -> Result<()> {
        self.store()
            .reset()
            .await
            .context("failed to clear menu catalog")?;
        self.profile
            .clear()
            .context("failed to clear saved profile")?;
        info!("local application state reset");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::NewMenuItem;
    use crate::profile::Profile;

    /// Source that always returns an empty catalog.
    struct EmptySource;

    impl CatalogSource for EmptySource {
        async fn fetch_catalog(&self) -> Result<Vec<NewMenuItem>, ApiError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn reset_clears_catalog_and_profile_together() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open_in_memory().unwrap();
        store
            .insert(NewMenuItem {
                name: "Greek Salad".to_string(),
                price: 12.99,
                description: String::new(),
                image: "https://example.com/dish.jpg".to_string(),
                category: "starters".to_string(),
            })
            .await
            .unwrap();

        let profile = ProfileStore::new(dir.path().to_path_buf());
        profile
            .save(&Profile {
                first_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                ..Default::default()
            })
            .unwrap();

        let app = App::with_components(Config::default(), store, EmptySource, profile);
        assert!(app.profile().onboarded());

        app.reset().await.unwrap();

        assert!(app.store().select_all().await.unwrap().is_empty());
        assert!(!app.profile().onboarded());
    }
}
