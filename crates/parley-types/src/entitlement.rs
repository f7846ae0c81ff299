//! Entitlement ledger types.
//!
//! Each user owns exactly one ledger row tracking free and paid message
//! balances. Balances never go negative; the store layer enforces this with
//! conditional decrements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-in-time view of a user's message balances.
///
/// One snapshot is taken at gate-check time and governs the whole turn,
/// including which balance the final debit comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub free_left: i64,
    pub paid_left: i64,
}

impl BalanceSnapshot {
    /// Whether any balance permits a turn at all.
    pub fn any_left(&self) -> bool {
        self.free_left > 0 || self.paid_left > 0
    }

    /// Which balance a successful turn should debit: paid preferred over free.
    pub fn debit_kind(&self) -> BalanceKind {
        if self.paid_left > 0 {
            BalanceKind::Paid
        } else {
            BalanceKind::Free
        }
    }
}

/// The two debit sources in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    Free,
    Paid,
}

/// Full ledger row, as returned to the client at launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlements {
    pub user_id: Uuid,
    pub free_messages_left: i64,
    pub paid_messages_left: i64,
    pub is_using_paid: bool,
}

/// Outcome of an attempt to credit a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    /// The transaction was new; the balance was credited.
    Applied,
    /// The transaction id had already been processed; nothing changed.
    AlreadyProcessed,
}

/// A billing-provider transaction that has already been credited.
///
/// The UNIQUE `transaction_id` column is the idempotency barrier for the
/// purchase reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_id: String,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
}
