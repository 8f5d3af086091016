//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::connect::HttpAccountProvisioner;
use crate::embedded::{EmbeddedNodeLifecycle, NodeEngine};
use crate::profile::{EmbeddedNetwork, CUSTOM_RELAY_SERVER, DEFAULT_RELAY_SERVER};
use crate::profile::{NodeKind, SessionOptions};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pairing: PairingConfig,
    #[serde(default)]
    pub embedded: EmbeddedConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub managed_account: ManagedAccountConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the profile list and active selection
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairingConfig {
    /// Relays offered for remote pairing
    #[serde(default = "default_relay_servers")]
    pub relay_servers: Vec<String>,
    #[serde(default = "default_relay_server")]
    pub default_relay_server: String,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            relay_servers: default_relay_servers(),
            default_relay_server: default_relay_server(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedConfig {
    #[serde(default = "default_network")]
    pub default_network: EmbeddedNetwork,

    /// A running embedded node is only released by restarting the process
    #[serde(default = "default_true")]
    pub restart_required: bool,

    /// Root directory for embedded wallet working directories
    #[serde(default = "default_embedded_directory")]
    pub default_directory: PathBuf,
}

impl Default for EmbeddedConfig {
    fn default() -> Self {
        Self {
            default_network: default_network(),
            restart_required: true,
            default_directory: default_embedded_directory(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Offer paste-source contents for import when an edit session opens
    #[serde(default = "default_true")]
    pub suggest_from_clipboard: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            suggest_from_clipboard: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagedAccountConfig {
    /// Servers that hold user funds
    #[serde(default = "default_custodial_hosts")]
    pub custodial_hosts: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// SOCKS proxy used when account creation goes over Tor
    #[serde(default)]
    pub tor_proxy: Option<String>,
}

impl Default for ManagedAccountConfig {
    fn default() -> Self {
        Self {
            custodial_hosts: default_custodial_hosts(),
            request_timeout_secs: default_request_timeout_secs(),
            tor_proxy: None,
        }
    }
}

impl ManagedAccountConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("profiles.json")
}

fn default_relay_servers() -> Vec<String> {
    vec![
        DEFAULT_RELAY_SERVER.to_string(),
        CUSTOM_RELAY_SERVER.to_string(),
    ]
}

fn default_relay_server() -> String {
    DEFAULT_RELAY_SERVER.to_string()
}

fn default_network() -> EmbeddedNetwork {
    EmbeddedNetwork::Mainnet
}

fn default_embedded_directory() -> PathBuf {
    PathBuf::from("wallets")
}

fn default_custodial_hosts() -> Vec<String> {
    vec![
        "https://lndhub.io".to_string(),
        "https://lndhub.herokuapp.com".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix LNPROFILES_)
            .add_source(
                config::Environment::with_prefix("LNPROFILES")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("pairing.relay_servers")
                    .with_list_parse_key("managed_account.custodial_hosts")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.pairing.relay_servers.is_empty() {
            anyhow::bail!("pairing.relay_servers must not be empty");
        }

        if !self
            .pairing
            .relay_servers
            .contains(&self.pairing.default_relay_server)
        {
            anyhow::bail!(
                "default relay {} is not in pairing.relay_servers",
                self.pairing.default_relay_server
            );
        }

        if self.managed_account.request_timeout_secs == 0 {
            anyhow::bail!("managed_account.request_timeout_secs must be positive");
        }

        for host in &self.managed_account.custodial_hosts {
            url::Url::parse(host)
                .with_context(|| format!("Invalid custodial host URL: {}", host))?;
        }

        if let Some(proxy) = &self.managed_account.tor_proxy {
            let parsed = url::Url::parse(proxy)
                .with_context(|| format!("Invalid Tor proxy URL: {}", proxy))?;
            if !parsed.scheme().starts_with("socks5") {
                anyhow::bail!("managed_account.tor_proxy must be a socks5:// or socks5h:// URL");
            }
        }

        if !self.import.suggest_from_clipboard {
            tracing::debug!("Import suggestions disabled");
        }

        Ok(())
    }

    /// Options for edit sessions built from this configuration
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            suggest_imports: self.import.suggest_from_clipboard,
            custodial_hosts: self.managed_account.custodial_hosts.clone(),
            default_kind: NodeKind::Embedded,
            default_network: self.embedded.default_network,
            relay_servers: self.pairing.relay_servers.clone(),
            default_relay_server: self.pairing.default_relay_server.clone(),
        }
    }

    /// Managed-account provisioner with the configured timeout and Tor proxy
    pub fn account_provisioner(&self) -> HttpAccountProvisioner {
        let provisioner = HttpAccountProvisioner::new(self.managed_account.request_timeout());
        match &self.managed_account.tor_proxy {
            Some(proxy) => provisioner.with_tor_proxy(proxy.clone()),
            None => provisioner,
        }
    }

    /// Embedded lifecycle creating wallets under `embedded.default_directory`
    pub fn embedded_lifecycle(&self, engine: Arc<dyn NodeEngine>) -> EmbeddedNodeLifecycle {
        EmbeddedNodeLifecycle::with_wallet_root(engine, self.embedded.default_directory.clone())
    }

    /// Get configuration for display
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Storage:
    settings_path: {}
  Pairing:
    relay_servers: {:?}
    default_relay_server: {}
  Embedded:
    default_network: {}
    restart_required: {}
    default_directory: {}
  Import:
    suggest_from_clipboard: {}
  Managed account:
    custodial_hosts: {:?}
    request_timeout: {}s
    tor_proxy: {}
"#,
            self.storage.settings_path.display(),
            self.pairing.relay_servers,
            self.pairing.default_relay_server,
            self.embedded.default_network,
            self.embedded.restart_required,
            self.embedded.default_directory.display(),
            self.import.suggest_from_clipboard,
            self.managed_account.custodial_hosts,
            self.managed_account.request_timeout_secs,
            self.managed_account.tor_proxy.as_deref().unwrap_or("(not set)"),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            pairing: PairingConfig::default(),
            embedded: EmbeddedConfig::default(),
            import: ImportConfig::default(),
            managed_account: ManagedAccountConfig::default(),
        }
    }
}
