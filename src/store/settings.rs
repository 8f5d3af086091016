//! Settings snapshot and persistence
//!
//! The profile list lives in the application settings. Commands produce a
//! [`SettingsUpdate`]; a [`SettingsPersistence`] implementation commits it
//! and returns the new snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::profile::Profile;

/// Persisted settings relevant to node profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub profiles: Vec<Profile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,

    /// Set after restoring an embedded wallet from a seed
    #[serde(default)]
    pub recovery: bool,
}

impl Settings {
    /// Index of the profile the app connects to
    ///
    /// An unset selection falls back to the first entry.
    pub fn active_index(&self) -> Option<usize> {
        match self.selected_index {
            Some(i) => Some(i),
            None if !self.profiles.is_empty() => Some(0),
            None => None,
        }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active_index() == Some(index)
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.active_index().and_then(|i| self.profiles.get(i))
    }

    pub fn profile(&self, index: usize) -> Result<&Profile> {
        self.profiles.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.profiles.len(),
        })
    }

    /// Apply a partial update, enforcing the selection invariant
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<()> {
        let profiles = update.profiles.unwrap_or_else(|| self.profiles.clone());
        let selected_index = update.selected_index.unwrap_or(self.selected_index);

        if let Some(index) = selected_index {
            if index >= profiles.len() {
                return Err(Error::ContractViolation(format!(
                    "selected index {} outside list of {}",
                    index,
                    profiles.len()
                )));
            }
        }

        self.profiles = profiles;
        self.selected_index = selected_index;
        if let Some(recovery) = update.recovery {
            self.recovery = recovery;
        }

        Ok(())
    }
}

/// Partial settings update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub profiles: Option<Vec<Profile>>,

    /// `Some(None)` clears the selection
    pub selected_index: Option<Option<usize>>,

    pub recovery: Option<bool>,
}

impl SettingsUpdate {
    pub fn profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Some(profiles),
            ..Default::default()
        }
    }

    pub fn select(index: Option<usize>) -> Self {
        Self {
            selected_index: Some(index),
            ..Default::default()
        }
    }

    pub fn with_selection(mut self, index: Option<usize>) -> Self {
        self.selected_index = Some(index);
        self
    }

    pub fn with_recovery(mut self, recovery: bool) -> Self {
        self.recovery = Some(recovery);
        self
    }
}

/// Durable settings store
#[async_trait]
pub trait SettingsPersistence: Send + Sync {
    /// Current snapshot
    async fn snapshot(&self) -> Result<Settings>;

    /// Commit a partial update and return the new snapshot
    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings>;
}

/// Settings kept in memory only
#[derive(Debug, Default)]
pub struct InMemorySettings {
    settings: RwLock<Settings>,
}

impl InMemorySettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsPersistence for InMemorySettings {
    async fn snapshot(&self) -> Result<Settings> {
        Ok(self.settings.read().await.clone())
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings> {
        let mut settings = self.settings.write().await;
        let mut next = settings.clone();
        next.apply(update)?;
        *settings = next.clone();
        Ok(next)
    }
}

/// Settings stored as a JSON file
pub struct JsonSettingsFile {
    path: PathBuf,

    /// Serializes read-modify-write cycles
    lock: RwLock<()>,
}

impl JsonSettingsFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Settings> {
        if !tokio::fs::try_exists(&self.path).await? {
            warn!("{} not found, starting with empty settings", self.path.display());
            return Ok(Settings::default());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read settings: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Deserialization(format!("Failed to parse settings: {}", e)))
    }

    async fn write(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| Error::Serialization(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // write to a sibling file, then rename over the original
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write settings: {}", e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to replace settings: {}", e)))?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl SettingsPersistence for JsonSettingsFile {
    async fn snapshot(&self) -> Result<Settings> {
        let _guard = self.lock.read().await;
        self.read().await
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings> {
        let _guard = self.lock.write().await;

        let mut settings = self.read().await?;
        settings.apply(update)?;
        self.write(&settings).await?;

        info!(
            "Settings updated ({} profiles, selected {:?})",
            settings.profiles.len(),
            settings.selected_index
        );
        Ok(settings)
    }
}
