//! Node connection profiles
//!
//! - `types`: persisted profile shape
//! - `draft`: editable state with per-field validation
//! - `diff`: reconnect decision on save
//! - `session`: one edit session tying draft, store and lifecycle together

pub mod diff;
pub mod draft;
pub mod session;
pub mod types;

pub use diff::{ProfileDiff, ReconnectPlan};
pub use draft::{Field, FieldErrors, ProfileDraft, SaveReadiness};
pub use session::{
    AccountCreation, DeleteStep, EditSession, SaveOutcome, SessionControl, SessionOptions,
    SessionServices,
};
pub use types::{
    ClnRestCredentials, Credentials, EmbeddedNetwork, EmbeddedWalletMaterial, LndCredentials,
    ManagedAccountCredentials, NodeKind, PairingCredentials, Profile, WalletConnectCredentials,
    CUSTOM_RELAY_SERVER, DEFAULT_RELAY_SERVER, LEGACY_WORKING_DIRECTORY,
};
