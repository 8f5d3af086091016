//! Structural diff between two profile snapshots
//!
//! Decides whether saving the active profile needs a reconnect.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::types::{NodeKind, Profile};

/// Fields that never require a reconnect
const COSMETIC_FIELDS: [&str; 2] = ["nickname", "photo"];

/// Keys whose values differ between two profiles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDiff {
    changed: BTreeSet<String>,
}

impl ProfileDiff {
    /// Symmetric difference of key/value pairs, excluding cosmetic fields
    pub fn between(original: &Profile, edited: &Profile) -> Self {
        let left = flatten(original);
        let right = flatten(edited);

        let mut changed = BTreeSet::new();
        for (key, value) in &left {
            if right.get(key) != Some(value) {
                changed.insert(key.clone());
            }
        }
        for (key, value) in &right {
            if left.get(key) != Some(value) {
                changed.insert(key.clone());
            }
        }

        for field in COSMETIC_FIELDS {
            changed.remove(field);
        }

        Self { changed }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Names of the changed fields
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(String::as_str)
    }
}

fn flatten(profile: &Profile) -> BTreeMap<String, Value> {
    match serde_json::to_value(profile) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        // Profile always serializes to an object
        _ => BTreeMap::new(),
    }
}

/// What the caller must do after saving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPlan {
    /// Nothing connection-relevant changed; return to the previous screen
    None,

    /// Reconnect: optionally tear down the current session, then mark connecting
    Reconnect { disconnect_first: bool },
}

impl ReconnectPlan {
    /// Plan for saving `edited` over `original`
    ///
    /// Only edits to the active profile ever reconnect. A new active entry
    /// (no original) always reconnects.
    pub fn for_save(original: Option<&Profile>, edited: &Profile, editing_active: bool) -> Self {
        if !editing_active {
            return ReconnectPlan::None;
        }

        if let Some(original) = original {
            if ProfileDiff::between(original, edited).is_empty() {
                return ReconnectPlan::None;
            }
        }

        ReconnectPlan::Reconnect {
            disconnect_first: edited.kind() == NodeKind::RemotePairing,
        }
    }

    pub fn needs_reconnect(&self) -> bool {
        matches!(self, ReconnectPlan::Reconnect { .. })
    }
}
