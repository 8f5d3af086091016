//! Lightning node connection profiles
//!
//! Parsing of connection strings, per-field edit validation, the saved
//! profile list with its active selection, and the embedded wallet lifecycle.

pub mod cli;
pub mod config;
pub mod connect;
pub mod embedded;
pub mod error;
pub mod profile;
pub mod safety;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use profile::{EditSession, NodeKind, Profile, ProfileDraft};
pub use store::ProfileStore;
