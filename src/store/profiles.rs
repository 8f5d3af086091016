//! Profile list management
//!
//! Pure commands compute a [`SettingsUpdate`] from a snapshot; the
//! [`ProfileStore`] runs them against a persistence backend, one
//! submission at a time.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::profile::{Credentials, NodeKind, Profile};

use super::settings::{Settings, SettingsPersistence, SettingsUpdate};

/// Suffix appended to a copied profile's nickname
pub const COPY_SUFFIX: &str = " copy";

/// Selected index after deleting `deleted`
///
/// `remaining` is the list length after removal.
pub fn selected_after_delete(
    selected: Option<usize>,
    deleted: usize,
    remaining: usize,
) -> Option<usize> {
    let selected = selected?;

    if deleted > selected {
        Some(selected)
    } else if deleted < selected {
        Some(selected - 1)
    } else if remaining > 0 {
        Some(0)
    } else {
        None
    }
}

/// Reject profiles that a validated draft can never produce
pub fn check_complete(profile: &Profile) -> Result<()> {
    if let Credentials::ManagedAccount(account) = &profile.credentials {
        if account.account_url.is_empty()
            || account.username.is_empty()
            || account.password.is_empty()
        {
            return Err(Error::ContractViolation(
                "managed account settings missing".to_string(),
            ));
        }
    }
    Ok(())
}

/// Compute the update for saving `profile` at `index` (append when `None`)
pub fn save_command(
    settings: &Settings,
    profile: Profile,
    index: Option<usize>,
) -> Result<SettingsUpdate> {
    check_complete(&profile)?;

    let mut profiles = settings.profiles.clone();
    match index {
        Some(i) if i < profiles.len() => profiles[i] = profile,
        Some(i) => {
            return Err(Error::IndexOutOfRange {
                index: i,
                len: profiles.len(),
            })
        }
        None => profiles.push(profile),
    }

    Ok(SettingsUpdate::profiles(profiles))
}

/// Compute the update for deleting the profile at `index`
pub fn delete_command(settings: &Settings, index: usize) -> Result<SettingsUpdate> {
    settings.profile(index)?;

    let mut profiles = settings.profiles.clone();
    profiles.remove(index);
    let selected = selected_after_delete(settings.selected_index, index, profiles.len());

    Ok(SettingsUpdate::profiles(profiles).with_selection(selected))
}

/// Unsaved clone of a profile's connection fields
pub fn copy_profile(profile: &Profile) -> Result<Profile> {
    if !profile.kind().is_copyable() {
        return Err(Error::NotCopyable(format!(
            "{} profiles hold wallet material",
            profile.kind()
        )));
    }

    let mut copy = profile.clone();
    copy.nickname = format!("{}{}", profile.nickname, COPY_SUFFIX);
    Ok(copy)
}

/// Result of a save
#[derive(Debug, Clone)]
pub struct SaveResult {
    /// Index the profile was written to
    pub index: usize,

    /// Entry that was replaced, if any
    pub previous: Option<Profile>,

    /// Active index before the save
    pub previous_active: Option<usize>,

    pub settings: Settings,
}

/// Result of changing the active profile
#[derive(Debug, Clone)]
pub struct ActivateResult {
    /// The process must restart before the new embedded node can run
    pub restart_needed: bool,

    pub settings: Settings,
}

/// What the caller should do after a deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Return to the profile list
    Removed,

    /// No profiles remain; show first-run flow
    ListEmpty,

    /// The embedded node must be released by a process restart
    RestartNeeded,
}

/// Result of a deletion
#[derive(Debug, Clone)]
pub struct Deletion {
    pub removed: Profile,
    pub was_active: bool,
    pub outcome: DeleteOutcome,
    pub settings: Settings,
}

/// Unsaved copy ready for a subsequent save
#[derive(Debug, Clone)]
pub struct ProfileCopy {
    pub profile: Profile,

    /// Index the copy will occupy once saved (end of list)
    pub index: usize,
}

/// Ordered profile list with active selection
pub struct ProfileStore {
    persistence: Arc<dyn SettingsPersistence>,

    /// Held for the duration of a persistence operation
    submission: Mutex<()>,

    /// The platform releases a running embedded node only on process restart
    restart_required: bool,
}

impl ProfileStore {
    pub fn new(persistence: Arc<dyn SettingsPersistence>, restart_required: bool) -> Self {
        Self {
            persistence,
            submission: Mutex::new(()),
            restart_required,
        }
    }

    pub fn restart_required(&self) -> bool {
        self.restart_required
    }

    /// Current snapshot
    pub async fn settings(&self) -> Result<Settings> {
        self.persistence.snapshot().await
    }

    /// Check if a submission is in flight
    pub fn is_busy(&self) -> bool {
        self.submission.try_lock().is_err()
    }

    /// Save a profile, appending when `index` is `None`
    pub async fn save(&self, profile: Profile, index: Option<usize>) -> Result<SaveResult> {
        let _guard = self.submission.try_lock().map_err(|_| Error::Busy)?;

        let before = self.persistence.snapshot().await?;
        let previous = index.and_then(|i| before.profiles.get(i).cloned());
        let kind = profile.kind();

        let update = save_command(&before, profile, index)?;
        let settings = self.persistence.update_settings(update).await?;
        let index = index.unwrap_or(settings.profiles.len() - 1);

        info!("Saved {} profile at index {}", kind, index);

        Ok(SaveResult {
            index,
            previous,
            previous_active: before.active_index(),
            settings,
        })
    }

    /// Append a profile and make it active in one update
    pub async fn save_as_active(&self, profile: Profile, recovery: bool) -> Result<SaveResult> {
        let _guard = self.submission.try_lock().map_err(|_| Error::Busy)?;

        let before = self.persistence.snapshot().await?;
        let mut update = save_command(&before, profile, None)?;
        let index = before.profiles.len();
        update = update.with_selection(Some(index));
        if recovery {
            update = update.with_recovery(true);
        }

        let settings = self.persistence.update_settings(update).await?;
        info!("Saved new active profile at index {}", index);

        Ok(SaveResult {
            index,
            previous: None,
            previous_active: before.active_index(),
            settings,
        })
    }

    /// Make the profile at `index` active
    ///
    /// `node_running` reports whether an embedded node already runs in this process.
    pub async fn set_active(&self, index: usize, node_running: bool) -> Result<ActivateResult> {
        let _guard = self.submission.try_lock().map_err(|_| Error::Busy)?;

        let before = self.persistence.snapshot().await?;
        let kind = before.profile(index)?.kind();

        let settings = self
            .persistence
            .update_settings(SettingsUpdate::select(Some(index)))
            .await?;

        let restart_needed =
            kind == NodeKind::Embedded && node_running && self.restart_required;
        if restart_needed {
            info!("Embedded node already running; restart needed to switch");
        }

        info!("Active profile set to index {}", index);
        Ok(ActivateResult {
            restart_needed,
            settings,
        })
    }

    /// Remove the profile at `index` and recompute the selection
    pub async fn delete(&self, index: usize) -> Result<Deletion> {
        let _guard = self.submission.try_lock().map_err(|_| Error::Busy)?;

        let before = self.persistence.snapshot().await?;
        let removed = before.profile(index)?.clone();
        let was_active = before.is_active(index);

        let update = delete_command(&before, index)?;
        let settings = self.persistence.update_settings(update).await?;

        let outcome = if settings.profiles.is_empty() {
            DeleteOutcome::ListEmpty
        } else {
            DeleteOutcome::Removed
        };

        info!(
            "Deleted {} profile at index {} ({} remain)",
            removed.kind(),
            index,
            settings.profiles.len()
        );

        Ok(Deletion {
            removed,
            was_active,
            outcome,
            settings,
        })
    }

    /// Unsaved copy of the profile at `index`
    pub async fn copy(&self, index: usize) -> Result<ProfileCopy> {
        let settings = self.persistence.snapshot().await?;
        let profile = copy_profile(settings.profile(index)?)?;
        debug!("Copied profile {} for editing", index);

        Ok(ProfileCopy {
            profile,
            index: settings.profiles.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{EmbeddedWalletMaterial, LndCredentials, ManagedAccountCredentials};
    use crate::store::settings::{InMemorySettings, JsonSettingsFile};
    use tempfile::tempdir;

    fn lnd(name: &str) -> Profile {
        Profile::new(
            name,
            Credentials::Lnd(LndCredentials {
                host: format!("{}.local", name),
                port: Some("10009".to_string()),
                macaroon_hex: "0201".to_string(),
            }),
        )
    }

    fn embedded(name: &str) -> Profile {
        Profile::new(
            name,
            Credentials::Embedded(EmbeddedWalletMaterial {
                seed_words: vec!["abandon".to_string(); 24],
                generated_password: "pw".to_string(),
                admin_credential: "0201".to_string(),
                network: Default::default(),
                working_directory: Some("dir-1".to_string()),
            }),
        )
    }

    fn store_with(profiles: Vec<Profile>, selected: Option<usize>) -> ProfileStore {
        let settings = Settings {
            profiles,
            selected_index: selected,
            recovery: false,
        };
        ProfileStore::new(Arc::new(InMemorySettings::new(settings)), true)
    }

    #[test]
    fn test_selected_after_delete_table() {
        // (selected, deleted, remaining) -> expected
        let cases = [
            (Some(1), 2, 3, Some(1)),
            (Some(2), 0, 3, Some(1)),
            (Some(1), 1, 2, Some(0)),
            (Some(0), 0, 0, None),
            (None, 0, 2, None),
        ];
        for (selected, deleted, remaining, expected) in cases {
            assert_eq!(
                selected_after_delete(selected, deleted, remaining),
                expected,
                "selected {:?} deleted {}",
                selected,
                deleted
            );
        }
    }

    #[test]
    fn test_selected_after_delete_exhaustive() {
        for n in 1..6usize {
            for s in 0..n {
                for i in 0..n {
                    let got = selected_after_delete(Some(s), i, n - 1);
                    let expected = if i > s {
                        Some(s)
                    } else if i < s {
                        Some(s - 1)
                    } else if n - 1 > 0 {
                        Some(0)
                    } else {
                        None
                    };
                    assert_eq!(got, expected);
                    if let Some(g) = got {
                        assert!(g < n - 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_incomplete_managed_account_is_contract_violation() {
        let profile = Profile::new(
            "hub",
            Credentials::ManagedAccount(ManagedAccountCredentials {
                account_url: "https://hub.example.com".to_string(),
                username: String::new(),
                password: "pw".to_string(),
                existing_account: true,
                dismiss_custodial_warning: false,
            }),
        );

        let err = save_command(&Settings::default(), profile, None).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[tokio::test]
    async fn test_save_appends_and_replaces() {
        let store = store_with(vec![], None);

        let first = store.save(lnd("a"), None).await.unwrap();
        assert_eq!(first.index, 0);
        assert!(first.previous.is_none());

        let second = store.save(lnd("b"), None).await.unwrap();
        assert_eq!(second.index, 1);

        let replaced = store.save(lnd("c"), Some(0)).await.unwrap();
        assert_eq!(replaced.previous.unwrap().nickname, "a");
        assert_eq!(replaced.settings.profiles[0].nickname, "c");
        assert_eq!(replaced.settings.profiles.len(), 2);
    }

    #[tokio::test]
    async fn test_save_out_of_range() {
        let store = store_with(vec![lnd("a")], None);
        let err = store.save(lnd("b"), Some(5)).await.unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }));
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = ProfileStore::new(Arc::new(JsonSettingsFile::new(&path)), false);

        let mut profile = lnd("home");
        profile.photo = Some("file:///home.png".to_string());
        profile.use_tor = true;
        store.save(profile.clone(), None).await.unwrap();
        store.save(embedded("phone"), None).await.unwrap();

        let loaded = JsonSettingsFile::new(&path).snapshot().await.unwrap();
        assert_eq!(loaded.profiles[0], profile);
        assert_eq!(loaded.profiles[1], embedded("phone"));
    }

    #[tokio::test]
    async fn test_delete_recomputes_selection() {
        let store = store_with(vec![lnd("a"), lnd("b"), lnd("c")], Some(2));

        let deletion = store.delete(0).await.unwrap();
        assert_eq!(deletion.settings.selected_index, Some(1));
        assert_eq!(deletion.outcome, DeleteOutcome::Removed);
        assert!(!deletion.was_active);

        let deletion = store.delete(1).await.unwrap();
        assert!(deletion.was_active);
        assert_eq!(deletion.settings.selected_index, Some(0));

        let deletion = store.delete(0).await.unwrap();
        assert_eq!(deletion.settings.selected_index, None);
        assert_eq!(deletion.outcome, DeleteOutcome::ListEmpty);
    }

    #[tokio::test]
    async fn test_set_active_flags_restart_for_embedded() {
        let store = store_with(vec![lnd("a"), embedded("b")], Some(0));

        let result = store.set_active(1, true).await.unwrap();
        assert!(result.restart_needed);
        assert_eq!(result.settings.selected_index, Some(1));

        let result = store.set_active(1, false).await.unwrap();
        assert!(!result.restart_needed);

        let result = store.set_active(0, true).await.unwrap();
        assert!(!result.restart_needed);
    }

    #[tokio::test]
    async fn test_copy() {
        let store = store_with(vec![lnd("a"), embedded("b")], Some(0));

        let copy = store.copy(0).await.unwrap();
        assert_eq!(copy.profile.nickname, "a copy");
        assert_eq!(copy.index, 2);
        assert_eq!(copy.profile.credentials, lnd("a").credentials);

        assert!(matches!(store.copy(1).await, Err(Error::NotCopyable(_))));
        assert_eq!(store.settings().await.unwrap().profiles.len(), 2);
    }

    #[tokio::test]
    async fn test_save_as_active_selects_new_entry() {
        let store = store_with(vec![lnd("a")], Some(0));
        let result = store.save_as_active(embedded("b"), true).await.unwrap();
        assert_eq!(result.index, 1);
        assert_eq!(result.settings.selected_index, Some(1));
        assert!(result.settings.recovery);
    }

    #[tokio::test]
    async fn test_concurrent_submission_is_busy() {
        let store = store_with(vec![lnd("a")], Some(0));
        let _held = store.submission.lock().await;
        assert!(store.is_busy());
        assert!(matches!(store.delete(0).await, Err(Error::Busy)));
    }
}
