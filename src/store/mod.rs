//! Profile storage
//!
//! # Architecture
//!
//! ```text
//! ProfileStore ──commands──► SettingsUpdate ──► SettingsPersistence
//!                                               (JsonSettingsFile | InMemorySettings)
//! KeyValueStore ◄── pairing session keys
//! ```

pub mod keyvalue;
pub mod profiles;
pub mod settings;

pub use keyvalue::{KeyValueStore, MemoryKeyValueStore, PairingSessionKeys};
pub use profiles::{
    ActivateResult, DeleteOutcome, Deletion, ProfileCopy, ProfileStore, SaveResult,
};
pub use settings::{
    InMemorySettings, JsonSettingsFile, Settings, SettingsPersistence, SettingsUpdate,
};
