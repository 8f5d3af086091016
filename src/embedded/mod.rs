//! Embedded node support
//!
//! The node itself runs in an external engine; this module sequences wallet
//! creation and deletion around it.

pub mod engine;
pub mod lifecycle;

pub use engine::{CreateWalletRequest, CreatedWallet, NodeEngine};
pub use lifecycle::{CreateRequest, EmbeddedNodeLifecycle, LifecycleState};
