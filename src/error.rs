//! Error types for profile management

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for profile management
#[derive(Error, Debug)]
pub enum Error {
    // Profile list errors
    #[error("Profile index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Profile cannot be saved: {0}")]
    NotSaveable(String),

    #[error("Profile cannot be copied: {0}")]
    NotCopyable(String),

    #[error("Another submission is still in flight")]
    Busy,

    // Embedded node errors
    #[error("Embedded wallet creation already in progress")]
    CreationInFlight,

    #[error("Embedded wallet creation failed: {0}")]
    WalletCreation(String),

    #[error("Node engine error: {0}")]
    Engine(String),

    #[error("Profile at index {0} is not an embedded node")]
    NotEmbedded(usize),

    // Managed account errors
    #[error("Account creation failed: {0}")]
    AccountCreation(String),

    #[error("HTTP error: {0}")]
    Http(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Busy
                | Error::WalletCreation(_)
                | Error::Engine(_)
                | Error::Http(_)
                | Error::AccountCreation(_)
        )
    }

    /// Check if this error is a programmer-level invariant failure
    ///
    /// These are expected to be unreachable through a validated draft.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::ContractViolation(_) | Error::IndexOutOfRange { .. }
        )
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}
