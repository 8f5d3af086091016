//! Editable profile draft
//!
//! The draft keeps text for every kind's fields so switching kinds back and
//! forth does not lose input. Only the current kind's fields are validated
//! and copied into the saved [`Profile`].

use tracing::debug;

use crate::connect::{AccountLogin, ParsedConnection};
use crate::error::{Error, Result};
use crate::validation::fields;
use crate::validation::{EditOutcome, FieldRule};

use super::types::{
    ClnRestCredentials, Credentials, EmbeddedNetwork, EmbeddedWalletMaterial, LndCredentials,
    ManagedAccountCredentials, NodeKind, PairingCredentials, Profile, WalletConnectCredentials,
    CUSTOM_RELAY_SERVER, DEFAULT_RELAY_SERVER,
};

/// Validated text field of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Host,
    Port,
    Macaroon,
    Rune,
    AccountUrl,
    Username,
    PairingPhrase,
    CustomRelay,
    WalletConnectUrl,
}

impl Field {
    pub fn rule(&self) -> FieldRule {
        match self {
            Field::Host => fields::HOST,
            Field::Port => fields::PORT,
            Field::Macaroon => fields::MACAROON,
            Field::Rune => fields::RUNE_FIELD,
            Field::AccountUrl => fields::ACCOUNT_URL,
            Field::Username => fields::USERNAME,
            Field::PairingPhrase => fields::PAIRING_PHRASE,
            Field::CustomRelay => fields::CUSTOM_RELAY,
            Field::WalletConnectUrl => fields::WALLET_CONNECT_URL,
        }
    }

    /// Fields re-checked when they lose focus
    pub fn checked_on_blur(&self) -> bool {
        matches!(
            self,
            Field::Host
                | Field::Port
                | Field::AccountUrl
                | Field::CustomRelay
                | Field::PairingPhrase
        )
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rule().name)
    }
}

/// Per-field error flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub host: bool,
    pub port: bool,
    pub macaroon: bool,
    pub rune: bool,
    pub account_url: bool,
    pub username: bool,
    pub pairing_phrase: bool,
    pub custom_relay: bool,
    pub wallet_connect_url: bool,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> bool {
        match field {
            Field::Host => self.host,
            Field::Port => self.port,
            Field::Macaroon => self.macaroon,
            Field::Rune => self.rune,
            Field::AccountUrl => self.account_url,
            Field::Username => self.username,
            Field::PairingPhrase => self.pairing_phrase,
            Field::CustomRelay => self.custom_relay,
            Field::WalletConnectUrl => self.wallet_connect_url,
        }
    }

    fn set(&mut self, field: Field, error: bool) {
        let flag = match field {
            Field::Host => &mut self.host,
            Field::Port => &mut self.port,
            Field::Macaroon => &mut self.macaroon,
            Field::Rune => &mut self.rune,
            Field::AccountUrl => &mut self.account_url,
            Field::Username => &mut self.username,
            Field::PairingPhrase => &mut self.pairing_phrase,
            Field::CustomRelay => &mut self.custom_relay,
            Field::WalletConnectUrl => &mut self.wallet_connect_url,
        };
        *flag = error;
    }
}

/// Whether a draft can be saved right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReadiness {
    Ready,

    /// Unchanged since the last save
    AlreadySaved,

    /// Required fields are empty
    Missing(Vec<Field>),

    /// Fields are flagged or fail their predicate
    Invalid(Vec<Field>),

    /// Embedded profile without a created wallet
    NoWallet,

    /// Certificate verification and Tor are both off; user must acknowledge
    NeedsCertificateWarning,
}

/// Editable state for one profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub kind: NodeKind,
    pub nickname: String,
    pub photo: Option<String>,

    pub host: String,
    pub port: String,
    pub macaroon_hex: String,
    pub rune: String,

    pub account_url: String,
    pub username: String,
    pub password: String,
    pub existing_account: bool,
    pub dismiss_custodial_warning: bool,

    pub pairing_phrase: String,
    pub relay_server: String,
    pub custom_relay_server: String,

    /// Session keys cached for the pairing phrase, display only
    pub local_key: Option<String>,
    pub remote_key: Option<String>,

    pub wallet_connect_url: String,

    pub network: EmbeddedNetwork,
    pub wallet: Option<EmbeddedWalletMaterial>,

    pub use_tor: bool,
    pub verify_cert: bool,
    pub cert_warning_acknowledged: bool,

    pub errors: FieldErrors,

    /// No unsaved changes
    pub saved: bool,

    /// Draft edits the active profile
    pub active: bool,

    /// List index of the edited profile; `None` for a new entry
    pub index: Option<usize>,
}

impl ProfileDraft {
    /// Empty draft for a new profile
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            nickname: String::new(),
            photo: None,
            host: String::new(),
            port: String::new(),
            macaroon_hex: String::new(),
            rune: String::new(),
            account_url: String::new(),
            username: String::new(),
            password: String::new(),
            existing_account: false,
            dismiss_custodial_warning: false,
            pairing_phrase: String::new(),
            relay_server: DEFAULT_RELAY_SERVER.to_string(),
            custom_relay_server: String::new(),
            local_key: None,
            remote_key: None,
            wallet_connect_url: String::new(),
            network: EmbeddedNetwork::default(),
            wallet: None,
            use_tor: false,
            verify_cert: kind == NodeKind::ManagedAccount,
            cert_warning_acknowledged: false,
            errors: FieldErrors::default(),
            saved: false,
            active: false,
            index: None,
        }
    }

    /// Draft loaded from a saved profile
    pub fn from_profile(index: usize, profile: &Profile, active: bool) -> Self {
        let mut draft = Self::new(profile.kind());
        draft.nickname = profile.nickname.clone();
        draft.photo = profile.photo.clone();
        draft.use_tor = profile.use_tor;
        draft.verify_cert = profile.verify_cert;
        draft.index = Some(index);
        draft.active = active;
        draft.saved = true;

        match &profile.credentials {
            Credentials::Lnd(c) => {
                draft.host = c.host.clone();
                draft.port = c.port.clone().unwrap_or_default();
                draft.macaroon_hex = c.macaroon_hex.clone();
            }
            Credentials::ClnRest(c) => {
                draft.host = c.host.clone();
                draft.port = c.port.clone().unwrap_or_default();
                draft.rune = c.rune.clone();
            }
            Credentials::ManagedAccount(c) => {
                draft.account_url = c.account_url.clone();
                draft.username = c.username.clone();
                draft.password = c.password.clone();
                draft.existing_account = c.existing_account;
                draft.dismiss_custodial_warning = c.dismiss_custodial_warning;
            }
            Credentials::RemotePairing(c) => {
                draft.pairing_phrase = c.pairing_phrase.clone();
                draft.relay_server = c.relay_server.clone();
                draft.custom_relay_server = c.custom_relay_server.clone().unwrap_or_default();
            }
            Credentials::NostrWalletConnect(c) => {
                draft.wallet_connect_url = c.wallet_connect_url.clone();
            }
            Credentials::Embedded(material) => {
                draft.network = material.network;
                draft.wallet = Some(material.clone());
            }
        }

        draft
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Host => &self.host,
            Field::Port => &self.port,
            Field::Macaroon => &self.macaroon_hex,
            Field::Rune => &self.rune,
            Field::AccountUrl => &self.account_url,
            Field::Username => &self.username,
            Field::PairingPhrase => &self.pairing_phrase,
            Field::CustomRelay => &self.custom_relay_server,
            Field::WalletConnectUrl => &self.wallet_connect_url,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Host => &mut self.host,
            Field::Port => &mut self.port,
            Field::Macaroon => &mut self.macaroon_hex,
            Field::Rune => &mut self.rune,
            Field::AccountUrl => &mut self.account_url,
            Field::Username => &mut self.username,
            Field::PairingPhrase => &mut self.pairing_phrase,
            Field::CustomRelay => &mut self.custom_relay_server,
            Field::WalletConnectUrl => &mut self.wallet_connect_url,
        }
    }

    /// Apply a text edit through the field's policy
    pub fn edit(&mut self, field: Field, input: &str) -> EditOutcome {
        let outcome = field.rule().apply(self.value(field), input);
        if outcome.accepted {
            *self.value_mut(field) = outcome.value.clone();
            self.saved = false;
        }
        self.errors.set(field, outcome.error);
        outcome
    }

    /// Re-check a field when it loses focus
    pub fn blur(&mut self, field: Field) {
        if field.checked_on_blur() {
            let error = field.rule().check_on_blur(self.value(field));
            self.errors.set(field, error);
        }
    }

    /// Switch implementation kind
    ///
    /// Resets the server addresses; other kinds' fields are kept.
    pub fn set_kind(&mut self, kind: NodeKind) {
        if kind == self.kind {
            return;
        }

        debug!("Draft kind {} -> {}", self.kind, kind);
        self.kind = kind;
        self.host.clear();
        self.account_url.clear();
        self.errors.set(Field::Host, false);
        self.errors.set(Field::AccountUrl, false);
        self.verify_cert = kind == NodeKind::ManagedAccount;
        self.cert_warning_acknowledged = false;
        self.saved = false;
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
        self.saved = false;
    }

    pub fn set_photo(&mut self, photo: Option<String>) {
        self.photo = photo;
        self.saved = false;
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        self.saved = false;
    }

    pub fn set_existing_account(&mut self, existing: bool) {
        self.existing_account = existing;
        self.saved = false;
    }

    /// Returns false when the current kind has no Tor toggle
    pub fn set_use_tor(&mut self, use_tor: bool) -> bool {
        if !self.kind.supports_tor() {
            return false;
        }
        self.use_tor = use_tor;
        self.saved = false;
        true
    }

    /// Returns false when the current kind has no certificate toggle
    pub fn set_verify_cert(&mut self, verify_cert: bool) -> bool {
        if !self.kind.supports_cert_verification() {
            return false;
        }
        self.verify_cert = verify_cert;
        self.cert_warning_acknowledged = false;
        self.saved = false;
        true
    }

    /// Select a relay from the known list, or [`CUSTOM_RELAY_SERVER`]
    pub fn set_relay_server(&mut self, relay: impl Into<String>) {
        self.relay_server = relay.into();
        if self.relay_server != CUSTOM_RELAY_SERVER {
            self.errors.set(Field::CustomRelay, false);
        }
        self.saved = false;
    }

    pub fn set_network(&mut self, network: EmbeddedNetwork) {
        self.network = network;
        self.saved = false;
    }

    pub fn acknowledge_cert_warning(&mut self) {
        self.cert_warning_acknowledged = true;
    }

    pub fn dismiss_custodial_warning(&mut self) {
        self.dismiss_custodial_warning = true;
    }

    /// Fill fields from a parsed connection string
    pub fn apply_import(&mut self, parsed: ParsedConnection) {
        self.kind = parsed.kind();
        self.saved = false;
        self.cert_warning_acknowledged = false;

        match parsed {
            ParsedConnection::Lnd {
                host,
                port,
                macaroon_hex,
                use_tor,
            } => {
                self.host = host;
                self.port = port;
                self.macaroon_hex = macaroon_hex;
                self.use_tor = use_tor;
                for field in [Field::Host, Field::Port, Field::Macaroon] {
                    self.errors.set(field, false);
                }
            }
            ParsedConnection::ClnRest {
                host,
                port,
                rune,
                use_tor,
            } => {
                self.host = host;
                self.port = port;
                self.rune = rune;
                self.use_tor = use_tor;
                for field in [Field::Host, Field::Port, Field::Rune] {
                    self.errors.set(field, false);
                }
            }
            ParsedConnection::ManagedAccount {
                host,
                username,
                password,
                existing_account,
                use_tor,
            } => {
                // a hostless string leaves the server for manual entry
                if !host.is_empty() {
                    self.account_url = host;
                    self.use_tor = use_tor;
                }
                self.username = username;
                self.password = password;
                self.existing_account = existing_account;
                self.verify_cert = true;
                for field in [Field::AccountUrl, Field::Username] {
                    self.errors.set(field, false);
                }
            }
        }
    }

    /// Fill the login of a freshly created managed account
    pub fn apply_account(&mut self, login: AccountLogin) {
        self.username = login.login;
        self.password = login.password;
        self.existing_account = true;
        self.errors.set(Field::Username, false);
        self.saved = false;
    }

    fn custom_relay_selected(&self) -> bool {
        self.relay_server == CUSTOM_RELAY_SERVER
    }

    /// Text fields the current kind uses
    pub fn relevant_fields(&self) -> Vec<Field> {
        match self.kind {
            NodeKind::Lnd => vec![Field::Host, Field::Port, Field::Macaroon],
            NodeKind::ClnRest => vec![Field::Host, Field::Port, Field::Rune],
            NodeKind::ManagedAccount => vec![Field::AccountUrl, Field::Username],
            NodeKind::RemotePairing if self.custom_relay_selected() => {
                vec![Field::PairingPhrase, Field::CustomRelay]
            }
            NodeKind::RemotePairing => vec![Field::PairingPhrase],
            NodeKind::NostrWalletConnect => vec![Field::WalletConnectUrl],
            NodeKind::Embedded => vec![],
        }
    }

    /// Required fields of the current kind that are still empty
    pub fn missing_fields(&self) -> Vec<Field> {
        let required: Vec<Field> = match self.kind {
            NodeKind::Lnd => vec![Field::Host, Field::Macaroon],
            NodeKind::ClnRest => vec![Field::Host, Field::Rune],
            NodeKind::ManagedAccount => vec![Field::AccountUrl, Field::Username],
            _ => self.relevant_fields(),
        };

        required
            .into_iter()
            .filter(|f| self.value(*f).is_empty())
            .collect()
    }

    /// Relevant fields that are flagged or fail their predicate
    pub fn invalid_fields(&self) -> Vec<Field> {
        self.relevant_fields()
            .into_iter()
            .filter(|f| {
                let value = self.value(*f);
                self.errors.get(*f) || (!value.is_empty() && !f.rule().is_valid(value))
            })
            .collect()
    }

    fn password_missing(&self) -> bool {
        self.kind == NodeKind::ManagedAccount && self.password.is_empty()
    }

    fn has_wallet(&self) -> bool {
        self.wallet
            .as_ref()
            .is_some_and(|w| !w.admin_credential.is_empty())
    }

    pub fn save_readiness(&self) -> SaveReadiness {
        if self.saved {
            return SaveReadiness::AlreadySaved;
        }

        if self.kind == NodeKind::Embedded && !self.has_wallet() {
            return SaveReadiness::NoWallet;
        }

        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            return SaveReadiness::Invalid(invalid);
        }

        let missing = self.missing_fields();
        if !missing.is_empty() || self.password_missing() {
            return SaveReadiness::Missing(missing);
        }

        if self.kind.supports_cert_verification()
            && !self.verify_cert
            && !self.use_tor
            && !self.cert_warning_acknowledged
        {
            return SaveReadiness::NeedsCertificateWarning;
        }

        SaveReadiness::Ready
    }

    /// Save control is enabled; the certificate warning may still be pending
    pub fn can_save(&self) -> bool {
        matches!(
            self.save_readiness(),
            SaveReadiness::Ready | SaveReadiness::NeedsCertificateWarning
        )
    }

    /// Build the profile to persist from the current kind's fields
    pub fn to_profile(&self) -> Result<Profile> {
        let readiness = self.save_readiness();
        match &readiness {
            SaveReadiness::Ready | SaveReadiness::AlreadySaved => {}
            SaveReadiness::NeedsCertificateWarning => {
                return Err(Error::NotSaveable(
                    "certificate warning not acknowledged".to_string(),
                ))
            }
            SaveReadiness::NoWallet => {
                return Err(Error::NotSaveable("embedded wallet not created".to_string()))
            }
            SaveReadiness::Missing(fields) => {
                return Err(Error::NotSaveable(format!("missing {}", join(fields, "password"))))
            }
            SaveReadiness::Invalid(fields) => {
                return Err(Error::NotSaveable(format!("invalid {}", join(fields, ""))))
            }
        }

        let port = (!self.port.is_empty()).then(|| self.port.clone());
        let credentials = match self.kind {
            NodeKind::Lnd => Credentials::Lnd(LndCredentials {
                host: self.host.clone(),
                port,
                macaroon_hex: self.macaroon_hex.clone(),
            }),
            NodeKind::ClnRest => Credentials::ClnRest(ClnRestCredentials {
                host: self.host.clone(),
                port,
                rune: self.rune.clone(),
            }),
            NodeKind::ManagedAccount => Credentials::ManagedAccount(ManagedAccountCredentials {
                account_url: self.account_url.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                existing_account: self.existing_account,
                dismiss_custodial_warning: self.dismiss_custodial_warning,
            }),
            NodeKind::RemotePairing => Credentials::RemotePairing(PairingCredentials {
                pairing_phrase: self.pairing_phrase.clone(),
                relay_server: self.relay_server.clone(),
                custom_relay_server: self
                    .custom_relay_selected()
                    .then(|| self.custom_relay_server.clone()),
            }),
            NodeKind::NostrWalletConnect => {
                Credentials::NostrWalletConnect(WalletConnectCredentials {
                    wallet_connect_url: self.wallet_connect_url.clone(),
                })
            }
            NodeKind::Embedded => match &self.wallet {
                Some(material) => Credentials::Embedded(material.clone()),
                None => {
                    return Err(Error::NotSaveable("embedded wallet not created".to_string()))
                }
            },
        };

        let transport = self.kind.supports_tor();
        Ok(Profile {
            nickname: self.nickname.clone(),
            photo: self.photo.clone(),
            use_tor: transport && self.use_tor,
            verify_cert: transport && self.verify_cert,
            credentials,
        })
    }

    /// `lndhub://` export of a saved managed account
    pub fn account_export(&self) -> Option<String> {
        if !self.saved || self.kind != NodeKind::ManagedAccount {
            return None;
        }
        Some(
            ManagedAccountCredentials {
                account_url: self.account_url.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                existing_account: self.existing_account,
                dismiss_custodial_warning: self.dismiss_custodial_warning,
            }
            .export_uri(),
        )
    }
}

fn join(fields: &[Field], extra: &str) -> String {
    let mut names: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    if names.is_empty() && !extra.is_empty() {
        names.push(extra.to_string());
    }
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::EditPolicy;

    const PHRASE: &str = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";

    fn lnd_draft() -> ProfileDraft {
        let mut draft = ProfileDraft::new(NodeKind::Lnd);
        draft.edit(Field::Host, "node.example.com");
        draft.edit(Field::Macaroon, "0201036c6e64");
        draft
    }

    #[test]
    fn test_single_character_filter() {
        let mut draft = ProfileDraft::new(NodeKind::Lnd);
        draft.edit(Field::Port, "1");
        let outcome = draft.edit(Field::Port, "1x");
        assert_eq!(outcome.policy, EditPolicy::SingleCharacter);
        assert_eq!(draft.port, "1");

        draft.edit(Field::Macaroon, "ab");
        draft.edit(Field::Macaroon, "abz");
        assert_eq!(draft.macaroon_hex, "ab");
    }

    #[test]
    fn test_rejected_keystroke_keeps_value() {
        let mut draft = ProfileDraft::new(NodeKind::RemotePairing);
        draft.edit(Field::PairingPhrase, "alpha bravo");
        let outcome = draft.edit(Field::PairingPhrase, "alpha bravo ");
        assert!(outcome.accepted);
        let outcome = draft.edit(Field::PairingPhrase, "alpha bravo  ");
        assert!(!outcome.accepted);
        assert_eq!(draft.pairing_phrase, "alpha bravo ");
    }

    #[test]
    fn test_bulk_paste_flags_invalid_and_shrink_clears() {
        let mut draft = ProfileDraft::new(NodeKind::Lnd);
        draft.edit(Field::Host, "  not a host!  ");
        assert!(draft.errors.host);
        assert!(!draft.can_save());

        let shorter: String = draft.host.chars().take(3).collect();
        draft.edit(Field::Host, &shorter);
        assert!(!draft.errors.host);
    }

    #[test]
    fn test_blur_rechecks_typed_values() {
        let mut draft = ProfileDraft::new(NodeKind::Lnd);
        for ch in "node:99999".chars() {
            let next = format!("{}{}", draft.host, ch);
            draft.edit(Field::Host, &next);
        }
        assert_eq!(draft.host, "node:99999");
        assert!(!draft.errors.host);
        draft.blur(Field::Host);
        assert!(draft.errors.host);

        draft.edit(Field::Port, "");
        draft.blur(Field::Port);
        assert!(!draft.errors.port);
    }

    #[test]
    fn test_required_fields_per_kind() {
        let draft = ProfileDraft::new(NodeKind::Lnd);
        assert_eq!(
            draft.save_readiness(),
            SaveReadiness::Missing(vec![Field::Host, Field::Macaroon])
        );

        let mut draft = ProfileDraft::new(NodeKind::ManagedAccount);
        draft.edit(Field::AccountUrl, "https://hub.example.com");
        draft.edit(Field::Username, "alice");
        assert_eq!(draft.save_readiness(), SaveReadiness::Missing(vec![]));
        draft.set_password("pw");
        assert_eq!(draft.save_readiness(), SaveReadiness::Ready);

        let mut draft = ProfileDraft::new(NodeKind::RemotePairing);
        draft.edit(Field::PairingPhrase, PHRASE);
        assert_eq!(draft.save_readiness(), SaveReadiness::Ready);
        draft.set_relay_server(CUSTOM_RELAY_SERVER);
        assert_eq!(
            draft.save_readiness(),
            SaveReadiness::Missing(vec![Field::CustomRelay])
        );
    }

    #[test]
    fn test_certificate_warning_gate() {
        let mut draft = lnd_draft();
        assert_eq!(draft.save_readiness(), SaveReadiness::NeedsCertificateWarning);
        assert!(draft.can_save());
        assert!(draft.to_profile().is_err());

        draft.acknowledge_cert_warning();
        assert_eq!(draft.save_readiness(), SaveReadiness::Ready);

        let mut draft = lnd_draft();
        draft.set_use_tor(true);
        assert_eq!(draft.save_readiness(), SaveReadiness::Ready);
    }

    #[test]
    fn test_kind_switch_keeps_secrets_but_saves_current_only() {
        let mut draft = lnd_draft();
        draft.set_kind(NodeKind::NostrWalletConnect);
        assert!(draft.host.is_empty());
        assert_eq!(draft.macaroon_hex, "0201036c6e64");
        assert!(!draft.verify_cert);

        draft.edit(Field::WalletConnectUrl, "nostr+walletconnect://abc?relay=wss://r");
        let profile = draft.to_profile().unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("macaroon"));
        assert_eq!(profile.kind(), NodeKind::NostrWalletConnect);

        draft.set_kind(NodeKind::ManagedAccount);
        assert!(draft.verify_cert);
    }

    #[test]
    fn test_toggles_only_for_transport_kinds() {
        let mut draft = ProfileDraft::new(NodeKind::RemotePairing);
        assert!(!draft.set_use_tor(true));
        assert!(!draft.set_verify_cert(true));
        assert!(!draft.use_tor);

        let mut draft = ProfileDraft::new(NodeKind::ClnRest);
        assert!(draft.set_use_tor(true));
    }

    #[test]
    fn test_apply_import_lndhub() {
        let mut draft = ProfileDraft::new(NodeKind::Lnd);
        draft.apply_import(ParsedConnection::ManagedAccount {
            host: "https://hub.example.com".to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
            existing_account: true,
            use_tor: false,
        });

        assert_eq!(draft.kind, NodeKind::ManagedAccount);
        assert_eq!(draft.account_url, "https://hub.example.com");
        assert_eq!(draft.save_readiness(), SaveReadiness::Ready);
        assert!(!draft.saved);
    }

    #[test]
    fn test_hostless_import_keeps_typed_server() {
        let mut draft = ProfileDraft::new(NodeKind::ManagedAccount);
        draft.edit(Field::AccountUrl, "https://myhub.example.com");
        draft.apply_import(crate::connect::parse("lndhub://nohost").unwrap());

        assert_eq!(draft.kind, NodeKind::ManagedAccount);
        assert_eq!(draft.account_url, "https://myhub.example.com");
        assert!(!draft.existing_account);
    }

    #[test]
    fn test_profile_roundtrip_through_draft() {
        let mut draft = lnd_draft();
        draft.edit(Field::Port, "10009");
        draft.set_nickname("home");
        draft.acknowledge_cert_warning();
        let profile = draft.to_profile().unwrap();
        assert_eq!(profile.credentials.display_host(), Some("node.example.com"));

        let loaded = ProfileDraft::from_profile(2, &profile, true);
        assert!(loaded.saved);
        assert_eq!(loaded.index, Some(2));
        assert_eq!(loaded.to_profile().unwrap(), profile);
        assert_eq!(loaded.save_readiness(), SaveReadiness::AlreadySaved);
    }

    #[test]
    fn test_embedded_requires_wallet() {
        let draft = ProfileDraft::new(NodeKind::Embedded);
        assert_eq!(draft.save_readiness(), SaveReadiness::NoWallet);
        assert!(!draft.can_save());
    }

    #[test]
    fn test_account_export() {
        let mut draft = ProfileDraft::new(NodeKind::ManagedAccount);
        draft.apply_import(ParsedConnection::ManagedAccount {
            host: "hub.example.com".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            existing_account: true,
            use_tor: false,
        });
        assert!(draft.account_export().is_none());
        draft.saved = true;
        assert_eq!(draft.account_export().as_deref(), Some("lndhub://u:p@hub.example.com"));
    }
}
