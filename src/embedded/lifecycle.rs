//! Embedded wallet lifecycle
//!
//! ```text
//! NoWallet ──create──► Creating ──ok──► Ready ──delete──► NoWallet
//!                          └──fail──► Error ──create──► Creating
//! ```
//!
//! Creation is stop-node → tune peers → create → persist. Credentials are
//! only persisted once the engine returned a complete wallet; any failure
//! leaves the profile list untouched.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::profile::{Credentials, EmbeddedNetwork, EmbeddedWalletMaterial, Profile};
use crate::store::{DeleteOutcome, Deletion, ProfileStore, SaveResult};

use super::engine::{CreateWalletRequest, NodeEngine};

/// Lifecycle state of an embedded wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    NoWallet,
    Creating,
    Ready,
    Error(String),
}

/// Parameters for creating an embedded wallet profile
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub nickname: String,
    pub photo: Option<String>,
    pub network: EmbeddedNetwork,

    /// Seed mnemonic for restore flows
    pub recovery_seed: Option<String>,

    /// Static channel backup for restore flows
    pub channel_backup: Option<String>,
}

/// Orchestrates wallet creation and teardown through the node engine
pub struct EmbeddedNodeLifecycle {
    engine: Arc<dyn NodeEngine>,
    state: Mutex<LifecycleState>,

    /// Parent of the per-wallet working directories; empty for engine-relative names
    wallet_root: PathBuf,
}

/// Moves the state out of `Creating` if the create future is dropped mid-flight
struct CreationGuard<'a> {
    state: &'a Mutex<LifecycleState>,
    finished: bool,
}

impl Drop for CreationGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Embedded wallet creation cancelled");
            *lock(self.state) = LifecycleState::Error("creation cancelled".to_string());
        }
    }
}

// recover the value from a poisoned lock
fn lock(state: &Mutex<LifecycleState>) -> MutexGuard<'_, LifecycleState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EmbeddedNodeLifecycle {
    pub fn new(engine: Arc<dyn NodeEngine>) -> Self {
        Self::with_wallet_root(engine, PathBuf::new())
    }

    /// Lifecycle placing new wallets under `wallet_root`
    pub fn with_wallet_root(engine: Arc<dyn NodeEngine>, wallet_root: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            state: Mutex::new(LifecycleState::NoWallet),
            wallet_root: wallet_root.into(),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        lock(&self.state).clone()
    }

    /// Create actions are disabled while this is true
    pub async fn is_creating(&self) -> bool {
        *lock(&self.state) == LifecycleState::Creating
    }

    pub fn node_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Create a wallet and persist it as the new active profile
    pub async fn create(&self, store: &ProfileStore, request: CreateRequest) -> Result<SaveResult> {
        {
            let mut state = lock(&self.state);
            if *state == LifecycleState::Creating {
                return Err(Error::CreationInFlight);
            }
            *state = LifecycleState::Creating;
        }
        let mut guard = CreationGuard {
            state: &self.state,
            finished: false,
        };

        let result = self.run_creation(store, request).await;
        guard.finished = true;

        let mut state = lock(&self.state);
        match &result {
            Ok(saved) => {
                info!("Embedded wallet ready at index {}", saved.index);
                *state = LifecycleState::Ready;
            }
            Err(e) => {
                error!("Embedded wallet creation failed: {}", e);
                *state = LifecycleState::Error(e.to_string());
            }
        }

        result
    }

    async fn run_creation(&self, store: &ProfileStore, request: CreateRequest) -> Result<SaveResult> {
        let creation_failed = |e: Error| Error::WalletCreation(e.to_string());

        // only one embedded node may run per process
        self.engine.stop_node().await.map_err(creation_failed)?;
        self.engine
            .tune_peer_discovery(request.network.is_testnet())
            .await
            .map_err(creation_failed)?;

        let directory = self
            .wallet_root
            .join(Uuid::new_v4().to_string())
            .to_string_lossy()
            .into_owned();
        info!(
            "Creating {} embedded wallet (restore: {})",
            request.network,
            request.recovery_seed.is_some()
        );

        let created = self
            .engine
            .create_wallet(CreateWalletRequest {
                directory: directory.clone(),
                seed_mnemonic: request.recovery_seed.clone(),
                network: request.network,
                channel_backup: request.channel_backup.clone(),
            })
            .await
            .map_err(creation_failed)?;

        if !created.is_complete() {
            self.discard_wallet(&directory).await;
            return Err(Error::WalletCreation(
                "engine returned an incomplete wallet".to_string(),
            ));
        }

        let profile = Profile {
            nickname: request.nickname,
            photo: request.photo,
            use_tor: false,
            verify_cert: false,
            credentials: Credentials::Embedded(EmbeddedWalletMaterial {
                seed_words: created.seed_words,
                generated_password: created.generated_password,
                admin_credential: created.admin_credential,
                network: request.network,
                working_directory: Some(directory.clone()),
            }),
        };

        match store
            .save_as_active(profile, request.recovery_seed.is_some())
            .await
        {
            Ok(saved) => Ok(saved),
            Err(e) => {
                self.discard_wallet(&directory).await;
                Err(e)
            }
        }
    }

    /// Best-effort removal of a wallet that never made it into the list
    async fn discard_wallet(&self, directory: &str) {
        if let Err(e) = self.engine.delete_wallet(directory).await {
            warn!("Failed to discard unused wallet directory: {}", e);
        }
    }

    /// Tear down the wallet behind the embedded profile at `index`, then remove it
    pub async fn delete(&self, store: &ProfileStore, index: usize) -> Result<Deletion> {
        let settings = store.settings().await?;
        let directory = settings
            .profile(index)?
            .wallet_material()
            .map(|m| m.directory().to_string())
            .ok_or(Error::NotEmbedded(index))?;

        let node_running = self.engine.is_running();
        self.engine.delete_wallet(&directory).await?;
        info!("Embedded wallet data removed");

        let mut deletion = store.delete(index).await?;
        if deletion.was_active && node_running && store.restart_required() {
            deletion.outcome = DeleteOutcome::RestartNeeded;
        }

        *lock(&self.state) = LifecycleState::NoWallet;
        Ok(deletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedded::engine::CreatedWallet;
    use crate::profile::{LndCredentials, NodeKind};
    use crate::store::{InMemorySettings, Settings};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeEngine {
        calls: std::sync::Mutex<Vec<String>>,
        requests: std::sync::Mutex<Vec<CreateWalletRequest>>,
        fail_create: bool,
        incomplete: bool,
        running: AtomicBool,
        gate: Option<Arc<Notify>>,
        started: Arc<Notify>,
    }

    impl FakeEngine {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NodeEngine for FakeEngine {
        async fn create_wallet(&self, request: CreateWalletRequest) -> Result<CreatedWallet> {
            self.calls.lock().unwrap().push("create".to_string());
            self.requests.lock().unwrap().push(request);
            self.started.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_create {
                return Err(Error::Engine("wallet unlocker unavailable".to_string()));
            }
            Ok(CreatedWallet {
                admin_credential: if self.incomplete {
                    String::new()
                } else {
                    "0201abcd".to_string()
                },
                seed_words: vec!["abandon".to_string(); 24],
                generated_password: "generated".to_string(),
            })
        }

        async fn delete_wallet(&self, directory: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("delete:{}", directory));
            Ok(())
        }

        async fn stop_node(&self) -> Result<()> {
            self.calls.lock().unwrap().push("stop".to_string());
            Ok(())
        }

        async fn tune_peer_discovery(&self, testnet: bool) -> Result<()> {
            self.calls.lock().unwrap().push(format!("tune:{}", testnet));
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }
    }

    fn store(profiles: Vec<Profile>, selected: Option<usize>) -> ProfileStore {
        ProfileStore::new(
            Arc::new(InMemorySettings::new(Settings {
                profiles,
                selected_index: selected,
                recovery: false,
            })),
            true,
        )
    }

    fn lnd() -> Profile {
        Profile::new(
            "remote",
            Credentials::Lnd(LndCredentials {
                host: "node.local".to_string(),
                port: None,
                macaroon_hex: "ab".to_string(),
            }),
        )
    }

    fn request(network: EmbeddedNetwork) -> CreateRequest {
        CreateRequest {
            nickname: "phone".to_string(),
            network,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_persists_active_profile() {
        let engine = Arc::new(FakeEngine::default());
        let lifecycle = EmbeddedNodeLifecycle::new(engine.clone());
        let store = store(vec![lnd()], Some(0));

        let saved = lifecycle
            .create(&store, request(EmbeddedNetwork::Testnet))
            .await
            .unwrap();

        assert_eq!(saved.index, 1);
        assert_eq!(saved.settings.selected_index, Some(1));
        assert!(!saved.settings.recovery);
        assert_eq!(lifecycle.state().await, LifecycleState::Ready);

        let calls = engine.calls();
        assert_eq!(&calls[..3], &["stop", "tune:true", "create"]);

        let profile = &saved.settings.profiles[1];
        assert_eq!(profile.kind(), NodeKind::Embedded);
        let material = profile.wallet_material().unwrap();
        assert_eq!(material.admin_credential, "0201abcd");
        assert_eq!(material.seed_words.len(), 24);
        assert_eq!(material.generated_password, "generated");
        assert!(material.network.is_testnet());

        let requested_dir = engine.requests.lock().unwrap()[0].directory.clone();
        assert_eq!(material.working_directory.as_deref(), Some(requested_dir.as_str()));
    }

    #[tokio::test]
    async fn test_each_creation_gets_fresh_directory() {
        let engine = Arc::new(FakeEngine::default());
        let lifecycle = EmbeddedNodeLifecycle::new(engine.clone());
        let store = store(vec![], None);

        lifecycle.create(&store, request(EmbeddedNetwork::Mainnet)).await.unwrap();
        lifecycle.create(&store, request(EmbeddedNetwork::Mainnet)).await.unwrap();

        let requests = engine.requests.lock().unwrap();
        assert_ne!(requests[0].directory, requests[1].directory);
        assert!(Uuid::parse_str(&requests[0].directory).is_ok());
    }

    #[tokio::test]
    async fn test_restore_sets_recovery_flag() {
        let engine = Arc::new(FakeEngine::default());
        let lifecycle = EmbeddedNodeLifecycle::new(engine.clone());
        let store = store(vec![], None);

        let saved = lifecycle
            .create(
                &store,
                CreateRequest {
                    recovery_seed: Some("abandon ability".to_string()),
                    channel_backup: Some("c2NiLWJhY2t1cA==".to_string()),
                    ..request(EmbeddedNetwork::Mainnet)
                },
            )
            .await
            .unwrap();

        assert!(saved.settings.recovery);
        let sent = engine.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.seed_mnemonic.as_deref(), Some("abandon ability"));
        assert!(sent.channel_backup.is_some());
    }

    #[tokio::test]
    async fn test_failure_persists_nothing() {
        let engine = Arc::new(FakeEngine {
            fail_create: true,
            ..Default::default()
        });
        let lifecycle = EmbeddedNodeLifecycle::new(engine);
        let store = store(vec![lnd()], Some(0));

        let err = lifecycle
            .create(&store, request(EmbeddedNetwork::Mainnet))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::WalletCreation(_)));
        assert!(matches!(lifecycle.state().await, LifecycleState::Error(_)));
        let settings = store.settings().await.unwrap();
        assert_eq!(settings.profiles.len(), 1);
        assert_eq!(settings.selected_index, Some(0));
    }

    #[tokio::test]
    async fn test_incomplete_wallet_is_never_persisted() {
        let engine = Arc::new(FakeEngine {
            incomplete: true,
            ..Default::default()
        });
        let lifecycle = EmbeddedNodeLifecycle::new(engine.clone());
        let store = store(vec![], None);

        assert!(lifecycle
            .create(&store, request(EmbeddedNetwork::Mainnet))
            .await
            .is_err());
        assert!(store.settings().await.unwrap().profiles.is_empty());
        assert!(engine.calls().iter().any(|c| c.starts_with("delete:")));
    }

    #[tokio::test]
    async fn test_second_create_while_creating_is_rejected() {
        let gate = Arc::new(Notify::new());
        let engine = Arc::new(FakeEngine {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let started = engine.started.clone();
        let lifecycle = Arc::new(EmbeddedNodeLifecycle::new(engine));
        let store = Arc::new(store(vec![], None));

        let task = {
            let lifecycle = lifecycle.clone();
            let store = store.clone();
            tokio::spawn(async move {
                lifecycle
                    .create(&store, request(EmbeddedNetwork::Mainnet))
                    .await
            })
        };

        started.notified().await;
        assert!(lifecycle.is_creating().await);
        let second = lifecycle
            .create(&store, request(EmbeddedNetwork::Mainnet))
            .await;
        assert!(matches!(second, Err(Error::CreationInFlight)));

        gate.notify_one();
        assert!(task.await.unwrap().is_ok());
        assert_eq!(store.settings().await.unwrap().profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_create_allows_retry() {
        let gate = Arc::new(Notify::new());
        let engine = Arc::new(FakeEngine {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let started = engine.started.clone();
        let lifecycle = Arc::new(EmbeddedNodeLifecycle::new(engine));
        let store = Arc::new(store(vec![], None));

        let task = {
            let lifecycle = lifecycle.clone();
            let store = store.clone();
            tokio::spawn(async move {
                lifecycle
                    .create(&store, request(EmbeddedNetwork::Mainnet))
                    .await
            })
        };

        started.notified().await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(matches!(lifecycle.state().await, LifecycleState::Error(_)));
        assert!(!lifecycle.is_creating().await);

        gate.notify_one();
        assert!(lifecycle
            .create(&store, request(EmbeddedNetwork::Mainnet))
            .await
            .is_ok());
        assert_eq!(lifecycle.state().await, LifecycleState::Ready);
    }

    #[tokio::test]
    async fn test_wallet_root_prefixes_directory() {
        let engine = Arc::new(FakeEngine::default());
        let lifecycle = EmbeddedNodeLifecycle::with_wallet_root(engine.clone(), "wallets");
        let store = store(vec![], None);

        let saved = lifecycle.create(&store, request(EmbeddedNetwork::Mainnet)).await.unwrap();

        let requested = PathBuf::from(&engine.requests.lock().unwrap()[0].directory);
        assert_eq!(requested.parent(), Some(std::path::Path::new("wallets")));
        let name = requested.file_name().unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(name).is_ok());

        let material = saved.settings.profiles[0].wallet_material().unwrap();
        assert_eq!(
            material.working_directory.as_deref(),
            Some(requested.to_str().unwrap())
        );
    }

    #[tokio::test]
    async fn test_delete_tears_down_wallet_first() {
        let engine = Arc::new(FakeEngine::default());
        engine.running.store(true, Ordering::SeqCst);
        let lifecycle = EmbeddedNodeLifecycle::new(engine.clone());
        let store = store(vec![lnd()], Some(0));

        let saved = lifecycle.create(&store, request(EmbeddedNetwork::Mainnet)).await.unwrap();
        let directory = saved.settings.profiles[1]
            .wallet_material()
            .unwrap()
            .directory()
            .to_string();

        let deletion = lifecycle.delete(&store, 1).await.unwrap();
        assert_eq!(deletion.outcome, DeleteOutcome::RestartNeeded);
        assert_eq!(deletion.settings.selected_index, Some(0));
        assert_eq!(engine.calls().last().unwrap(), &format!("delete:{}", directory));
        assert_eq!(lifecycle.state().await, LifecycleState::NoWallet);
    }

    #[tokio::test]
    async fn test_delete_without_running_node_removes() {
        let engine = Arc::new(FakeEngine::default());
        let lifecycle = EmbeddedNodeLifecycle::new(engine);
        let store = store(vec![lnd()], Some(0));

        lifecycle.create(&store, request(EmbeddedNetwork::Mainnet)).await.unwrap();
        let deletion = lifecycle.delete(&store, 1).await.unwrap();
        assert_eq!(deletion.outcome, DeleteOutcome::Removed);
    }

    #[tokio::test]
    async fn test_delete_rejects_remote_profiles() {
        let lifecycle = EmbeddedNodeLifecycle::new(Arc::new(FakeEngine::default()));
        let store = store(vec![lnd()], Some(0));
        assert!(matches!(
            lifecycle.delete(&store, 0).await,
            Err(Error::NotEmbedded(0))
        ));
    }
}
