//! Locally saved user profile.
//!
//! The profile is the app's only writable local state besides the catalog:
//! a JSON file in the data directory, wrapped with its save time. Having a
//! saved profile is what marks onboarding as completed; clearing it (log
//! out or full reset) sends the user back through onboarding.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Profile file name in the data directory
const PROFILE_FILE: &str = "profile.json";

/// Per-channel notification opt-ins. Everything defaults to on, matching
/// the signup default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub order_status: bool,
    pub password_changes: bool,
    pub special_offers: bool,
    pub newsletter: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            order_status: true,
            password_changes: true,
            special_offers: true,
            newsletter: true,
        }
    }
}

/// The user's saved personal information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    /// Avatar image URI, if the user picked one.
    pub avatar: Option<String>,
    #[serde(default)]
    pub notifications: NotificationPrefs,
}

/// A saved profile together with when it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedProfile {
    pub profile: Profile,
    pub saved_at: DateTime<Utc>,
}

pub struct ProfileStore {
    data_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Load the saved profile, or `None` if onboarding has not been
    /// completed on this device.
    pub fn load(&self) -> Result<Option<SavedProfile>> {
        let path = self.profile_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read profile file")?;
        let saved: SavedProfile =
            serde_json::from_str(&contents).context("Failed to parse profile file")?;
        Ok(Some(saved))
    }

    /// Save `profile`, stamping the save time. Overwrites any previous save.
    pub fn save(&self, profile: &Profile) -> Result<()> {
        let saved = SavedProfile {
            profile: profile.clone(),
            saved_at: Utc::now(),
        };
        let path = self.profile_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&saved)?;
        std::fs::write(&path, contents)?;
        debug!(path = %path.display(), "profile saved");
        Ok(())
    }

    /// Remove the saved profile. The user counts as not onboarded
    /// afterwards.
    pub fn clear(&self) -> Result<()> {
        let path = self.profile_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove profile file")?;
        }
        Ok(())
    }

    /// Whether onboarding has been completed on this device.
    pub fn onboarded(&self) -> bool {
        self.profile_path().exists()
    }

    fn profile_path(&self) -> PathBuf {
        self.data_dir.join(PROFILE_FILE)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile {
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            email: "ada@example.com".to_string(),
            phone_number: Some("5551234567".to_string()),
            avatar: None,
            notifications: NotificationPrefs::default(),
        }
    }

    #[test]
    fn load_on_a_fresh_store_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().to_path_buf());
        assert!(store.load().unwrap().is_none());
        assert!(!store.onboarded());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().to_path_buf());

        store.save(&sample()).unwrap();
        assert!(store.onboarded());

        let saved = store.load().unwrap().expect("profile should exist");
        assert_eq!(saved.profile, sample());
    }

    #[test]
    fn clear_removes_the_profile_and_onboarding_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().to_path_buf());

        store.save(&sample()).unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(!store.onboarded());

        // Clearing an already-empty store is fine.
        store.clear().unwrap();
    }

    #[test]
    fn missing_notification_prefs_default_to_all_on() {
        let json = r#"{
            "profile": {
                "first_name": "Ada",
                "last_name": null,
                "email": "ada@example.com",
                "phone_number": null,
                "avatar": null
            },
            "saved_at": "2024-06-01T12:00:00Z"
        }"#;
        let saved: SavedProfile = serde_json::from_str(json).unwrap();
        assert!(saved.profile.notifications.order_status);
        assert!(saved.profile.notifications.newsletter);
    }
}
