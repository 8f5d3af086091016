//! Edit session for one profile
//!
//! Owns the draft and the deletion guard, and drives the store, the
//! embedded lifecycle and the node session hooks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::connect::account::is_custodial;
use crate::connect::{parse, AccountProvisioner, ImportCandidate, PasteSource};
use crate::embedded::{CreateRequest, EmbeddedNodeLifecycle};
use crate::error::{Error, Result};
use crate::safety::{DeletionContext, DeletionDecision, DeletionGuard, ModalAnswer, WalletExposure};
use crate::store::keyvalue::load_session_keys;
use crate::store::{ActivateResult, Deletion, KeyValueStore, ProfileStore};

use super::diff::ReconnectPlan;
use super::draft::ProfileDraft;
use super::types::{
    EmbeddedNetwork, NodeKind, Profile, CUSTOM_RELAY_SERVER, DEFAULT_RELAY_SERVER,
};

/// Hooks into the live node session
#[async_trait]
pub trait SessionControl: Send + Sync {
    /// Tear down the current backend session
    async fn disconnect(&self) -> Result<()>;

    /// Mark the app as (re)connecting to the active profile
    async fn set_connecting(&self, connecting: bool) -> Result<()>;
}

/// Collaborators shared by edit sessions
#[derive(Clone)]
pub struct SessionServices {
    pub store: Arc<ProfileStore>,
    pub keys: Arc<dyn KeyValueStore>,
    pub paste: Arc<dyn PasteSource>,
    pub control: Arc<dyn SessionControl>,
    pub lifecycle: Arc<EmbeddedNodeLifecycle>,
    pub accounts: Arc<dyn AccountProvisioner>,
}

/// Per-session options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Offer the paste source contents for import
    pub suggest_imports: bool,

    /// Managed-account servers that hold user funds
    pub custodial_hosts: Vec<String>,

    /// Kind preselected for a new profile
    pub default_kind: NodeKind,

    /// Network preselected for a new embedded wallet
    pub default_network: EmbeddedNetwork,

    /// Relays a pairing profile may select, [`CUSTOM_RELAY_SERVER`] included
    pub relay_servers: Vec<String>,
    pub default_relay_server: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            suggest_imports: true,
            custodial_hosts: Vec::new(),
            default_kind: NodeKind::Embedded,
            default_network: EmbeddedNetwork::default(),
            relay_servers: vec![
                DEFAULT_RELAY_SERVER.to_string(),
                CUSTOM_RELAY_SERVER.to_string(),
            ],
            default_relay_server: DEFAULT_RELAY_SERVER.to_string(),
        }
    }
}

impl SessionOptions {
    /// Empty draft carrying the configured defaults
    pub fn new_draft(&self, kind: NodeKind) -> ProfileDraft {
        let mut draft = ProfileDraft::new(kind);
        draft.network = self.default_network;
        draft.relay_server = self.default_relay_server.clone();
        draft
    }
}

/// Where to go after a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Back to the previous screen, no reconnect
    GoBack,

    /// Active profile changed; the session is reconnecting
    Reconnect { disconnect_first: bool },

    /// New active wallet; return to the main screen
    ReturnToMain,
}

/// Result of a delete request or modal answer
#[derive(Debug, Clone)]
pub enum DeleteStep {
    /// Guard state changed; nothing deleted
    Pending(DeletionDecision),

    Deleted(Deletion),

    /// User chose to activate the profile instead
    Activated(ActivateResult),
}

/// Result of a managed-account creation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCreation {
    Created,

    /// Server is custodial; the warning must be dismissed first
    NeedsCustodialWarning,
}

/// One edit session
pub struct EditSession {
    services: SessionServices,
    options: SessionOptions,
    draft: ProfileDraft,
    guard: DeletionGuard,
    import: Option<ImportCandidate>,
}

impl EditSession {
    pub fn new(services: SessionServices, options: SessionOptions) -> Self {
        let draft = options.new_draft(options.default_kind);
        Self {
            services,
            options,
            draft,
            guard: DeletionGuard::new(),
            import: None,
        }
    }

    /// Load the draft for an existing profile, or start a new one
    ///
    /// Called once per session.
    pub async fn initialize_draft(&mut self, existing: Option<(usize, &Profile)>) -> Result<()> {
        let settings = self.services.store.settings().await?;

        self.draft = match existing {
            Some((index, profile)) => {
                ProfileDraft::from_profile(index, profile, settings.is_active(index))
            }
            None => self.options.new_draft(self.options.default_kind),
        };
        self.guard.disarm();

        if self.draft.kind == NodeKind::RemotePairing && !self.draft.pairing_phrase.is_empty() {
            if let Some(keys) =
                load_session_keys(self.services.keys.as_ref(), &self.draft.pairing_phrase).await?
            {
                self.draft.local_key = Some(keys.local_key);
                self.draft.remote_key = Some(keys.remote_key);
            }
        }

        self.import =
            ImportCandidate::capture(self.services.paste.as_ref(), self.options.suggest_imports)
                .await?;

        debug!(
            "Edit session initialized ({} draft, index {:?})",
            self.draft.kind, self.draft.index
        );
        Ok(())
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ProfileDraft {
        &mut self.draft
    }

    pub fn guard(&self) -> &DeletionGuard {
        &self.guard
    }

    /// Select a relay for a pairing profile
    pub fn select_relay(&mut self, relay: &str) -> Result<()> {
        if !self.options.relay_servers.iter().any(|r| r == relay) {
            return Err(Error::ContractViolation(format!("unknown relay {}", relay)));
        }
        self.draft.set_relay_server(relay);
        Ok(())
    }

    /// Import suggestion captured at initialization
    pub fn import_candidate(&self) -> Option<&ImportCandidate> {
        self.import.as_ref()
    }

    /// Apply the import suggestion; returns false when it did not parse
    pub async fn accept_import(&mut self) -> Result<bool> {
        let Some(candidate) = self.import.take() else {
            return Ok(false);
        };

        match candidate.accept(self.services.paste.as_ref()).await? {
            Some(parsed) => {
                self.draft.apply_import(parsed);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn reject_import(&mut self) {
        if let Some(candidate) = self.import.take() {
            candidate.reject();
        }
    }

    /// Apply a scanned or typed connection string
    pub fn import(&mut self, text: &str) -> bool {
        match parse(text) {
            Some(parsed) => {
                self.draft.apply_import(parsed);
                true
            }
            None => false,
        }
    }

    /// Persist the draft
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        let profile = self.draft.to_profile()?;
        let index = self.draft.index;

        let saved = self.services.store.save(profile.clone(), index).await?;

        let editing_active = index.is_some() && index == saved.previous_active;
        let plan = ReconnectPlan::for_save(saved.previous.as_ref(), &profile, editing_active);

        self.draft.saved = true;
        self.draft.index = Some(saved.index);
        self.draft.active = saved.settings.is_active(saved.index);

        match plan {
            ReconnectPlan::None => Ok(SaveOutcome::GoBack),
            ReconnectPlan::Reconnect { disconnect_first } => {
                if disconnect_first {
                    self.services.control.disconnect().await?;
                }
                self.services.control.set_connecting(true).await?;
                info!("Active profile changed; reconnecting");
                Ok(SaveOutcome::Reconnect { disconnect_first })
            }
        }
    }

    fn saved_index(&self) -> Result<usize> {
        self.draft
            .index
            .filter(|_| self.draft.saved)
            .ok_or_else(|| Error::NotSaveable("profile has not been saved".to_string()))
    }

    /// Make the edited profile active
    pub async fn activate(&mut self) -> Result<ActivateResult> {
        let index = self.saved_index()?;
        let result = self
            .services
            .store
            .set_active(index, self.services.lifecycle.node_running())
            .await?;

        self.draft.active = true;
        if !result.restart_needed {
            self.services.control.set_connecting(true).await?;
        }
        Ok(result)
    }

    /// Unsaved copy of the edited profile, ready to become a new entry
    pub async fn copy(&self) -> Result<ProfileDraft> {
        let index = self.saved_index()?;
        let copy = self.services.store.copy(index).await?;

        let mut draft = ProfileDraft::from_profile(copy.index, &copy.profile, false);
        draft.index = None;
        draft.saved = false;
        Ok(draft)
    }

    /// Delete request; `exposure` describes the embedded wallet when active
    pub async fn request_delete(&mut self, exposure: WalletExposure) -> Result<DeleteStep> {
        self.saved_index()?;

        let context = DeletionContext {
            kind: self.draft.kind,
            active: self.draft.active,
            exposure,
        };
        let decision = self.guard.request(&context);
        self.follow(decision).await
    }

    /// Answer the open deletion modal
    pub async fn answer_delete(&mut self, answer: ModalAnswer) -> Result<DeleteStep> {
        let decision = self.guard.answer(answer);
        self.follow(decision).await
    }

    async fn follow(&mut self, decision: DeletionDecision) -> Result<DeleteStep> {
        match decision {
            DeletionDecision::Proceed => self.delete().await.map(DeleteStep::Deleted),
            DeletionDecision::Activate => self.activate().await.map(DeleteStep::Activated),
            other => Ok(DeleteStep::Pending(other)),
        }
    }

    async fn delete(&mut self) -> Result<Deletion> {
        let index = self.saved_index()?;
        let services = &self.services;

        let deletion = if self.draft.kind == NodeKind::Embedded {
            services.lifecycle.delete(&services.store, index).await?
        } else {
            services.store.delete(index).await?
        };

        self.draft.saved = false;
        self.draft.index = None;
        self.draft.active = false;
        Ok(deletion)
    }

    /// Create a new account on the draft's managed-account server
    pub async fn create_account(&mut self) -> Result<AccountCreation> {
        if self.draft.kind != NodeKind::ManagedAccount || self.draft.existing_account {
            return Err(Error::ContractViolation(
                "account creation needs a new managed account draft".to_string(),
            ));
        }
        if self.draft.account_url.is_empty() {
            return Err(Error::NotSaveable("account server missing".to_string()));
        }

        if is_custodial(&self.draft.account_url, &self.options.custodial_hosts)
            && !self.draft.dismiss_custodial_warning
        {
            warn!("Account server is custodial; warning not yet acknowledged");
            return Ok(AccountCreation::NeedsCustodialWarning);
        }

        let login = self
            .services
            .accounts
            .create_account(
                &self.draft.account_url,
                self.draft.verify_cert,
                self.draft.use_tor,
            )
            .await?;

        self.draft.apply_account(login);
        info!("Managed account created");
        Ok(AccountCreation::Created)
    }

    /// Create an embedded wallet from the draft and make it active
    pub async fn create_embedded(
        &mut self,
        recovery_seed: Option<String>,
        channel_backup: Option<String>,
    ) -> Result<SaveOutcome> {
        let request = CreateRequest {
            nickname: self.draft.nickname.clone(),
            photo: self.draft.photo.clone(),
            network: self.draft.network,
            recovery_seed,
            channel_backup,
        };

        let services = &self.services;
        let saved = services.lifecycle.create(&services.store, request).await?;
        let profile = saved.settings.profile(saved.index)?;
        self.draft = ProfileDraft::from_profile(saved.index, profile, true);

        Ok(SaveOutcome::ReturnToMain)
    }
}
