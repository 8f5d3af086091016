//! Core types for node connection profiles
//!
//! A profile is a shared envelope (nickname, photo, transport flags) plus
//! exactly one kind-specific credential payload.

use serde::{Deserialize, Serialize};

/// Default remote-pairing relay
pub const DEFAULT_RELAY_SERVER: &str = "mailbox.terminal.lightning.today:443";

/// Relay selection value meaning "use `custom_relay_server`"
pub const CUSTOM_RELAY_SERVER: &str = "custom-defined";

/// Working directory used by embedded profiles saved before directories were allocated
pub const LEGACY_WORKING_DIRECTORY: &str = "lnd";

/// Implementation kind of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// LND full node reached via host + macaroon
    Lnd,

    /// CLN node with the REST plugin, reached via host + rune
    ClnRest,

    /// Hosted account (LNDHub) reached via username + password
    ManagedAccount,

    /// Remote pairing session established from a one-time phrase
    RemotePairing,

    /// Nostr Wallet Connect account
    NostrWalletConnect,

    /// Node running inside this process
    Embedded,
}

impl NodeKind {
    /// All kinds, in presentation order
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Embedded,
        NodeKind::Lnd,
        NodeKind::ClnRest,
        NodeKind::RemotePairing,
        NodeKind::ManagedAccount,
        NodeKind::NostrWalletConnect,
    ];

    /// Check if the Tor toggle applies to this kind
    pub fn supports_tor(&self) -> bool {
        matches!(
            self,
            NodeKind::Lnd | NodeKind::ClnRest | NodeKind::ManagedAccount
        )
    }

    /// Check if the certificate-verification toggle applies to this kind
    pub fn supports_cert_verification(&self) -> bool {
        self.supports_tor()
    }

    /// Check if a profile of this kind may be duplicated
    pub fn is_copyable(&self) -> bool {
        !matches!(self, NodeKind::Embedded)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Lnd => write!(f, "lnd"),
            NodeKind::ClnRest => write!(f, "cln-rest"),
            NodeKind::ManagedAccount => write!(f, "managed-account"),
            NodeKind::RemotePairing => write!(f, "remote-pairing"),
            NodeKind::NostrWalletConnect => write!(f, "nostr-wallet-connect"),
            NodeKind::Embedded => write!(f, "embedded"),
        }
    }
}

/// Network an embedded wallet runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddedNetwork {
    #[default]
    Mainnet,
    Testnet,
}

impl EmbeddedNetwork {
    pub fn is_testnet(&self) -> bool {
        matches!(self, EmbeddedNetwork::Testnet)
    }
}

impl std::str::FromStr for EmbeddedNetwork {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(EmbeddedNetwork::Mainnet),
            "testnet" => Ok(EmbeddedNetwork::Testnet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

impl std::fmt::Display for EmbeddedNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddedNetwork::Mainnet => write!(f, "mainnet"),
            EmbeddedNetwork::Testnet => write!(f, "testnet"),
        }
    }
}

/// LND credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LndCredentials {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub macaroon_hex: String,
}

/// CLN-REST credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClnRestCredentials {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub rune: String,
}

/// Managed (LNDHub) account credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedAccountCredentials {
    /// Account server URL
    pub account_url: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub existing_account: bool,
    #[serde(default)]
    pub dismiss_custodial_warning: bool,
}

impl ManagedAccountCredentials {
    /// Render as an `lndhub://` URI for export
    pub fn export_uri(&self) -> String {
        format!(
            "lndhub://{}:{}@{}",
            self.username, self.password, self.account_url
        )
    }
}

/// Remote-pairing credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingCredentials {
    pub pairing_phrase: String,
    #[serde(default = "default_relay_server")]
    pub relay_server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_relay_server: Option<String>,
}

impl PairingCredentials {
    /// Relay address actually used for the session
    pub fn effective_relay(&self) -> &str {
        if self.relay_server == CUSTOM_RELAY_SERVER {
            self.custom_relay_server.as_deref().unwrap_or_default()
        } else {
            &self.relay_server
        }
    }
}

pub(crate) fn default_relay_server() -> String {
    DEFAULT_RELAY_SERVER.to_string()
}

/// Nostr Wallet Connect credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConnectCredentials {
    pub wallet_connect_url: String,
}

/// Secrets produced by embedded wallet creation
///
/// Attached once; a new creation always gets a new working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedWalletMaterial {
    pub seed_words: Vec<String>,
    pub generated_password: String,
    pub admin_credential: String,
    #[serde(default)]
    pub network: EmbeddedNetwork,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

impl EmbeddedWalletMaterial {
    /// Directory the node engine keeps this wallet in
    pub fn directory(&self) -> &str {
        self.working_directory
            .as_deref()
            .unwrap_or(LEGACY_WORKING_DIRECTORY)
    }
}

/// Kind-specific credential payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Credentials {
    Lnd(LndCredentials),
    ClnRest(ClnRestCredentials),
    ManagedAccount(ManagedAccountCredentials),
    RemotePairing(PairingCredentials),
    NostrWalletConnect(WalletConnectCredentials),
    Embedded(EmbeddedWalletMaterial),
}

impl Credentials {
    pub fn kind(&self) -> NodeKind {
        match self {
            Credentials::Lnd(_) => NodeKind::Lnd,
            Credentials::ClnRest(_) => NodeKind::ClnRest,
            Credentials::ManagedAccount(_) => NodeKind::ManagedAccount,
            Credentials::RemotePairing(_) => NodeKind::RemotePairing,
            Credentials::NostrWalletConnect(_) => NodeKind::NostrWalletConnect,
            Credentials::Embedded(_) => NodeKind::Embedded,
        }
    }

    /// Host shown in listings, if the kind has one
    pub fn display_host(&self) -> Option<&str> {
        match self {
            Credentials::Lnd(c) => Some(&c.host),
            Credentials::ClnRest(c) => Some(&c.host),
            Credentials::ManagedAccount(c) => Some(&c.account_url),
            Credentials::RemotePairing(c) => Some(c.effective_relay()),
            Credentials::NostrWalletConnect(_) | Credentials::Embedded(_) => None,
        }
    }
}

/// One saved node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub nickname: String,

    /// Photo reference (URI or file path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(default)]
    pub use_tor: bool,

    #[serde(default)]
    pub verify_cert: bool,

    #[serde(flatten)]
    pub credentials: Credentials,
}

impl Profile {
    pub fn new(nickname: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            nickname: nickname.into(),
            photo: None,
            use_tor: false,
            verify_cert: false,
            credentials,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.credentials.kind()
    }

    pub fn is_embedded(&self) -> bool {
        self.kind() == NodeKind::Embedded
    }

    /// Embedded wallet material, for embedded profiles
    pub fn wallet_material(&self) -> Option<&EmbeddedWalletMaterial> {
        match &self.credentials {
            Credentials::Embedded(material) => Some(material),
            _ => None,
        }
    }

    /// Label for listings: nickname, else host, else kind
    pub fn label(&self) -> String {
        if !self.nickname.is_empty() {
            return self.nickname.clone();
        }
        match self.credentials.display_host() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => self.kind().to_string(),
        }
    }
}
