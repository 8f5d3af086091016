//! Deletion safety gate
//!
//! Deleting a profile takes two requests. The first arms the guard; the
//! second runs the risk checks. An embedded wallet that still holds channels
//! or on-chain funds needs an explicit confirmation before it is destroyed.

use tracing::{debug, warn};

use crate::profile::NodeKind;

/// Funds and channels still held by an embedded wallet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletExposure {
    pub open_channels: usize,
    pub pending_channels: usize,

    /// On-chain balance in satoshis
    pub confirmed_balance: u64,
    pub unconfirmed_balance: u64,
}

impl WalletExposure {
    pub fn has_channels(&self) -> bool {
        self.open_channels > 0 || self.pending_channels > 0
    }

    pub fn has_balance(&self) -> bool {
        self.confirmed_balance > 0 || self.unconfirmed_balance > 0
    }
}

/// What the guard knows about the profile being deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionContext {
    pub kind: NodeKind,

    /// Profile is the active one
    pub active: bool,

    /// Only meaningful for an active embedded wallet
    pub exposure: WalletExposure,
}

/// Confirmation dialog raised by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionModal {
    /// Embedded wallet is not running; its funds cannot be inspected
    OfferActivation,

    /// Wallet still has open or pending channels
    ConfirmChannelRisk { open: usize, pending: usize },

    /// Wallet still holds on-chain funds
    ConfirmBalanceRisk { confirmed: u64, unconfirmed: u64 },
}

impl std::fmt::Display for DeletionModal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionModal::OfferActivation => {
                write!(
                    f,
                    "This wallet is not active. Activate it to check its funds before deleting?"
                )
            }
            DeletionModal::ConfirmChannelRisk { open, pending } => {
                write!(
                    f,
                    "Wallet has {} open and {} pending channels. Deleting it may lose those funds",
                    open, pending
                )
            }
            DeletionModal::ConfirmBalanceRisk {
                confirmed,
                unconfirmed,
            } => {
                write!(
                    f,
                    "Wallet holds {} sat confirmed and {} sat unconfirmed on-chain. Deleting it may lose those funds",
                    confirmed, unconfirmed
                )
            }
        }
    }
}

/// Answer to an open modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAnswer {
    Confirm,
    Cancel,
}

/// Guard decision for a request or answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionDecision {
    /// First request; ask the user to tap again
    Armed,

    /// Show this modal and wait for an answer
    Modal(DeletionModal),

    /// Delete now
    Proceed,

    /// Activate the profile instead of deleting it
    Activate,

    /// Nothing happens; the guard is disarmed
    Cancelled,
}

/// Two-step confirmation state machine for one profile
#[derive(Debug, Default)]
pub struct DeletionGuard {
    armed: bool,
    pending: Option<DeletionModal>,
}

impl DeletionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Modal currently awaiting an answer
    pub fn pending(&self) -> Option<DeletionModal> {
        self.pending
    }

    /// Handle a delete request
    pub fn request(&mut self, context: &DeletionContext) -> DeletionDecision {
        if let Some(modal) = self.pending {
            return DeletionDecision::Modal(modal);
        }

        if !self.armed {
            debug!("Deletion armed for {} profile", context.kind);
            self.armed = true;
            return DeletionDecision::Armed;
        }

        match Self::evaluate(context) {
            Some(modal) => {
                warn!("Deletion needs confirmation: {}", modal);
                self.pending = Some(modal);
                DeletionDecision::Modal(modal)
            }
            None => {
                self.disarm();
                DeletionDecision::Proceed
            }
        }
    }

    /// Handle the answer to the open modal
    pub fn answer(&mut self, answer: ModalAnswer) -> DeletionDecision {
        let Some(modal) = self.pending.take() else {
            warn!("Deletion answer with no open modal");
            self.disarm();
            return DeletionDecision::Cancelled;
        };

        self.disarm();
        match (answer, modal) {
            (ModalAnswer::Cancel, _) => {
                debug!("Deletion cancelled");
                DeletionDecision::Cancelled
            }
            (ModalAnswer::Confirm, DeletionModal::OfferActivation) => DeletionDecision::Activate,
            (ModalAnswer::Confirm, _) => DeletionDecision::Proceed,
        }
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.pending = None;
    }

    fn evaluate(context: &DeletionContext) -> Option<DeletionModal> {
        if context.kind != NodeKind::Embedded {
            return None;
        }

        if !context.active {
            return Some(DeletionModal::OfferActivation);
        }

        let exposure = &context.exposure;
        if exposure.has_channels() {
            return Some(DeletionModal::ConfirmChannelRisk {
                open: exposure.open_channels,
                pending: exposure.pending_channels,
            });
        }

        if exposure.has_balance() {
            return Some(DeletionModal::ConfirmBalanceRisk {
                confirmed: exposure.confirmed_balance,
                unconfirmed: exposure.unconfirmed_balance,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(active: bool, exposure: WalletExposure) -> DeletionContext {
        DeletionContext {
            kind: NodeKind::Embedded,
            active,
            exposure,
        }
    }

    #[test]
    fn test_first_request_only_arms() {
        let mut guard = DeletionGuard::new();
        let ctx = embedded(true, WalletExposure::default());

        assert_eq!(guard.request(&ctx), DeletionDecision::Armed);
        assert!(guard.is_armed());
        assert_eq!(guard.request(&ctx), DeletionDecision::Proceed);
        assert!(!guard.is_armed());
    }

    #[test]
    fn test_remote_profile_proceeds_on_second_request() {
        let mut guard = DeletionGuard::new();
        let ctx = DeletionContext {
            kind: NodeKind::Lnd,
            active: false,
            exposure: WalletExposure {
                open_channels: 3,
                ..Default::default()
            },
        };

        guard.request(&ctx);
        assert_eq!(guard.request(&ctx), DeletionDecision::Proceed);
    }

    #[test]
    fn test_inactive_embedded_offers_activation() {
        let mut guard = DeletionGuard::new();
        let ctx = embedded(false, WalletExposure::default());

        guard.request(&ctx);
        assert_eq!(
            guard.request(&ctx),
            DeletionDecision::Modal(DeletionModal::OfferActivation)
        );
        assert_eq!(guard.answer(ModalAnswer::Confirm), DeletionDecision::Activate);
        assert!(!guard.is_armed());
    }

    #[test]
    fn test_channels_checked_before_balance() {
        let mut guard = DeletionGuard::new();
        let ctx = embedded(
            true,
            WalletExposure {
                open_channels: 0,
                pending_channels: 1,
                confirmed_balance: 5_000,
                unconfirmed_balance: 0,
            },
        );

        guard.request(&ctx);
        assert_eq!(
            guard.request(&ctx),
            DeletionDecision::Modal(DeletionModal::ConfirmChannelRisk { open: 0, pending: 1 })
        );
    }

    #[test]
    fn test_balance_risk_confirm_proceeds() {
        let mut guard = DeletionGuard::new();
        let ctx = embedded(
            true,
            WalletExposure {
                unconfirmed_balance: 1,
                ..Default::default()
            },
        );

        guard.request(&ctx);
        assert!(matches!(
            guard.request(&ctx),
            DeletionDecision::Modal(DeletionModal::ConfirmBalanceRisk { .. })
        ));
        assert_eq!(guard.answer(ModalAnswer::Confirm), DeletionDecision::Proceed);
    }

    #[test]
    fn test_open_modal_blocks_requests() {
        let mut guard = DeletionGuard::new();
        let ctx = embedded(false, WalletExposure::default());

        guard.request(&ctx);
        let modal = guard.request(&ctx);
        assert_eq!(guard.request(&ctx), modal);
        assert_eq!(guard.request(&ctx), modal);
        assert_eq!(guard.pending(), Some(DeletionModal::OfferActivation));
    }

    #[test]
    fn test_cancel_disarms() {
        let mut guard = DeletionGuard::new();
        let ctx = embedded(
            true,
            WalletExposure {
                open_channels: 2,
                ..Default::default()
            },
        );

        guard.request(&ctx);
        guard.request(&ctx);
        assert_eq!(guard.answer(ModalAnswer::Cancel), DeletionDecision::Cancelled);
        assert!(guard.pending().is_none());

        // back to square one
        assert_eq!(guard.request(&ctx), DeletionDecision::Armed);
    }

    #[test]
    fn test_answer_without_modal() {
        let mut guard = DeletionGuard::new();
        assert_eq!(guard.answer(ModalAnswer::Confirm), DeletionDecision::Cancelled);
    }

    #[test]
    fn test_modal_messages() {
        let msg = DeletionModal::ConfirmBalanceRisk {
            confirmed: 1200,
            unconfirmed: 0,
        }
        .to_string();
        assert!(msg.contains("1200 sat confirmed"));
    }
}
