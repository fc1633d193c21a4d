//! Transaction model and status state machine.

use crate::{CurrencyCode, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of financial operation a transaction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Currency exchange between two of the user's balances.
    Exchange,
    /// Cross-border transfer to another party.
    Remittance,
    /// Buy/sell order against an investment product.
    Trade,
    /// Direct payment to a merchant or peer.
    Payment,
}

/// Transaction lifecycle status.
///
/// Status only moves forward: `Queued → Syncing → {Settled | Failed}`.
/// `Failed` is terminal; a retry is a new transaction with a fresh id so
/// that the audit order of the user's intents is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Waiting in the pending queue for connectivity.
    Queued,
    /// Currently being settled by the sync coordinator.
    Syncing,
    /// Settlement succeeded.
    Settled,
    /// Settlement failed.
    Failed,
}

impl TransactionStatus {
    /// Check if this is a final state.
    pub fn is_final(&self) -> bool {
        matches!(self, TransactionStatus::Settled | TransactionStatus::Failed)
    }

    /// Get valid next states from current state.
    pub fn valid_transitions(&self) -> &[TransactionStatus] {
        match self {
            TransactionStatus::Queued => &[TransactionStatus::Syncing],
            TransactionStatus::Syncing => {
                &[TransactionStatus::Settled, TransactionStatus::Failed]
            }
            TransactionStatus::Settled => &[],
            TransactionStatus::Failed => &[],
        }
    }

    /// Check if transition to given state is valid.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

/// A financial operation captured while the device may be offline.
///
/// Immutable except for `status`, which only the sync coordinator advances
/// via [`Transaction::transition_to`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, assigned at creation.
    pub id: TransactionId,
    /// What kind of operation this is.
    pub kind: TransactionKind,
    /// Amount in the source currency. Must be positive.
    pub amount: Decimal,
    /// Currency the amount is denominated in.
    pub source_currency: CurrencyCode,
    /// Currency the operation settles into.
    pub target_currency: CurrencyCode,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a new queued transaction with a fresh id.
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        source_currency: CurrencyCode,
        target_currency: CurrencyCode,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            source_currency,
            target_currency,
            created_at: Utc::now(),
            status: TransactionStatus::Queued,
        }
    }

    /// Transition to a new status.
    pub fn transition_to(
        &mut self,
        new_status: TransactionStatus,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(new_status) {
            return Err(InvalidTransition {
                from: self.status,
                to: new_status,
            });
        }
        self.status = new_status;
        Ok(())
    }

    /// Create a retry of a failed transaction: same payload, fresh id,
    /// back to `Queued`.
    pub fn retry(&self) -> Self {
        Self::new(
            self.kind,
            self.amount,
            self.source_currency.clone(),
            self.target_currency.clone(),
        )
    }
}

/// Error when attempting invalid status transition.
#[derive(Debug, Clone)]
pub struct InvalidTransition {
    pub from: TransactionStatus,
    pub to: TransactionStatus,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid status transition from {:?} to {:?}",
            self.from, self.to
        )
    }
}

impl std::error::Error for InvalidTransition {}
