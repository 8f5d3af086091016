//! Node engine interface
//!
//! The engine owns the on-disk wallets and the running node. This crate only
//! orchestrates it.

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::EmbeddedNetwork;

/// Wallet creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWalletRequest {
    /// Fresh working directory for this wallet
    pub directory: String,

    /// Seed mnemonic to restore from
    pub seed_mnemonic: Option<String>,

    pub network: EmbeddedNetwork,

    /// Base64 static channel backup to restore
    pub channel_backup: Option<String>,
}

/// Secrets returned by the engine for a new wallet
#[derive(Clone, PartialEq, Eq)]
pub struct CreatedWallet {
    pub admin_credential: String,
    pub seed_words: Vec<String>,
    pub generated_password: String,
}

impl std::fmt::Debug for CreatedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedWallet")
            .field("seed_words", &self.seed_words.len())
            .finish_non_exhaustive()
    }
}

impl CreatedWallet {
    /// Both the admin credential and the seed are present
    pub fn is_complete(&self) -> bool {
        !self.admin_credential.is_empty()
            && !self.seed_words.is_empty()
            && self.seed_words.iter().all(|w| !w.is_empty())
    }
}

/// Embedded node engine
#[async_trait]
pub trait NodeEngine: Send + Sync {
    /// Create (or restore) a wallet in `request.directory`
    async fn create_wallet(&self, request: CreateWalletRequest) -> Result<CreatedWallet>;

    /// Remove the wallet stored in `directory`
    async fn delete_wallet(&self, directory: &str) -> Result<()>;

    /// Stop the running node, if any
    async fn stop_node(&self) -> Result<()>;

    /// Adjust peer discovery for the chosen network
    async fn tune_peer_discovery(&self, testnet: bool) -> Result<()>;

    /// An embedded node is running in this process
    fn is_running(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness() {
        let mut wallet = CreatedWallet {
            admin_credential: "0201".to_string(),
            seed_words: vec!["abandon".to_string(); 24],
            generated_password: "pw".to_string(),
        };
        assert!(wallet.is_complete());

        wallet.seed_words.clear();
        assert!(!wallet.is_complete());

        wallet.seed_words = vec!["abandon".to_string()];
        wallet.admin_credential.clear();
        assert!(!wallet.is_complete());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let wallet = CreatedWallet {
            admin_credential: "deadbeef".to_string(),
            seed_words: vec!["zebra".to_string()],
            generated_password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", wallet);
        assert!(!rendered.contains("deadbeef"));
        assert!(!rendered.contains("zebra"));
        assert!(!rendered.contains("hunter2"));
    }
}
