//! Entitlement service: gate checks, debits, and purchase credits.
//!
//! Wraps a [`LedgerRepository`] with the policy decisions: when a turn is
//! permitted, when media is allowed, and which balance a successful turn
//! consumes.

use parley_types::entitlement::{BalanceKind, BalanceSnapshot, CreditOutcome, Entitlements};
use parley_types::error::EntitlementError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::repository::ledger::LedgerRepository;

/// Policy layer over the per-user entitlement ledger.
///
/// Generic over `LedgerRepository` so core logic stays testable against an
/// in-memory fake (parley-core never depends on parley-infra).
pub struct EntitlementService<L: LedgerRepository> {
    ledger: L,
}

impl<L: LedgerRepository> EntitlementService<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Create the ledger row for a fresh user.
    pub async fn init_for_user(
        &self,
        user_id: &Uuid,
        free_messages: i64,
    ) -> Result<(), EntitlementError> {
        self.ledger.init_ledger(user_id, free_messages).await?;
        Ok(())
    }

    /// The full ledger row, for the launch snapshot.
    pub async fn entitlements(&self, user_id: &Uuid) -> Result<Entitlements, EntitlementError> {
        self.ledger
            .entitlements(user_id)
            .await?
            .ok_or(EntitlementError::NotFound)
    }

    /// Gate check: read both balances once and decide whether a turn may
    /// proceed at all.
    ///
    /// The returned snapshot governs the whole turn, including which
    /// balance the final debit comes from.
    pub async fn check_and_classify(
        &self,
        user_id: &Uuid,
    ) -> Result<BalanceSnapshot, EntitlementError> {
        let row = self
            .ledger
            .entitlements(user_id)
            .await?
            .ok_or(EntitlementError::NotFound)?;

        let snapshot = BalanceSnapshot {
            free_left: row.free_messages_left,
            paid_left: row.paid_messages_left,
        };
        if !snapshot.any_left() {
            return Err(EntitlementError::Exhausted);
        }
        Ok(snapshot)
    }

    /// Media capability is gated strictly by the paid balance, independent
    /// of how many free messages remain.
    pub fn require_media_allowed(
        &self,
        snapshot: &BalanceSnapshot,
        has_images: bool,
        has_voice: bool,
    ) -> Result<(), EntitlementError> {
        if (has_images || has_voice) && snapshot.paid_left == 0 {
            return Err(EntitlementError::MediaRequiresPaid);
        }
        Ok(())
    }

    /// Debit exactly one message after a successful turn.
    ///
    /// Called only once the assistant message is persisted; a failed model
    /// call must never reach this. A debit that finds the balance already
    /// at zero (raced away mid-turn) is logged and tolerated -- the store
    /// clamps at zero, so the worst case is one over-generous grant.
    pub async fn debit_one_message(
        &self,
        user_id: &Uuid,
        used_paid: bool,
    ) -> Result<(), EntitlementError> {
        let kind = if used_paid { BalanceKind::Paid } else { BalanceKind::Free };
        let applied = self.ledger.debit(user_id, kind).await?;
        if !applied {
            warn!(user_id = %user_id, ?kind, "debit found balance already at zero");
        }
        Ok(())
    }

    /// Credit a reconciled purchase, exactly once per transaction id.
    pub async fn credit_purchase(
        &self,
        user_id: &Uuid,
        transaction_id: &str,
        product_id: &str,
        count: i64,
    ) -> Result<CreditOutcome, EntitlementError> {
        let outcome = self
            .ledger
            .credit_paid_once(user_id, transaction_id, product_id, count)
            .await?;
        match outcome {
            CreditOutcome::Applied => {
                info!(user_id = %user_id, transaction_id, count, "credited paid messages");
            }
            CreditOutcome::AlreadyProcessed => {
                info!(transaction_id, "transaction already processed, skipping credit");
            }
        }
        Ok(outcome)
    }

    /// Whether a transaction id has been reconciled for this user.
    pub async fn is_transaction_processed(
        &self,
        user_id: &Uuid,
        transaction_id: &str,
    ) -> Result<bool, EntitlementError> {
        Ok(self.ledger.is_transaction_processed(user_id, transaction_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ledger::fake::FakeLedgerRepository;

    fn service_with(free: i64, paid: i64) -> (EntitlementService<FakeLedgerRepository>, Uuid) {
        let user_id = Uuid::now_v7();
        let repo = FakeLedgerRepository::default();
        repo.seed(user_id, free, paid);
        (EntitlementService::new(repo), user_id)
    }

    #[tokio::test]
    async fn check_passes_with_free_only() {
        let (svc, user) = service_with(5, 0);
        let snap = svc.check_and_classify(&user).await.unwrap();
        assert_eq!(snap.free_left, 5);
        assert_eq!(snap.paid_left, 0);
    }

    #[tokio::test]
    async fn check_fails_when_exhausted() {
        let (svc, user) = service_with(0, 0);
        let err = svc.check_and_classify(&user).await.unwrap_err();
        assert!(matches!(err, EntitlementError::Exhausted));
    }

    #[tokio::test]
    async fn check_fails_without_ledger_row() {
        let svc = EntitlementService::new(FakeLedgerRepository::default());
        let err = svc.check_and_classify(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, EntitlementError::NotFound));
    }

    #[tokio::test]
    async fn media_requires_paid_balance() {
        let (svc, user) = service_with(5, 0);
        let snap = svc.check_and_classify(&user).await.unwrap();
        assert!(matches!(
            svc.require_media_allowed(&snap, true, false),
            Err(EntitlementError::MediaRequiresPaid)
        ));
        assert!(matches!(
            svc.require_media_allowed(&snap, false, true),
            Err(EntitlementError::MediaRequiresPaid)
        ));
        assert!(svc.require_media_allowed(&snap, false, false).is_ok());
    }

    #[tokio::test]
    async fn media_allowed_with_paid_balance() {
        let (svc, user) = service_with(0, 1);
        let snap = svc.check_and_classify(&user).await.unwrap();
        assert!(svc.require_media_allowed(&snap, true, true).is_ok());
    }

    #[tokio::test]
    async fn debit_never_goes_negative() {
        let (svc, user) = service_with(1, 0);
        svc.debit_one_message(&user, false).await.unwrap();
        // Second debit finds the balance at zero; tolerated, still clamped.
        svc.debit_one_message(&user, false).await.unwrap();
        let ent = svc.entitlements(&user).await.unwrap();
        assert_eq!(ent.free_messages_left, 0);
        assert_eq!(ent.paid_messages_left, 0);
    }

    #[tokio::test]
    async fn credit_purchase_is_idempotent() {
        let (svc, user) = service_with(0, 0);
        let first = svc
            .credit_purchase(&user, "tx-1", "messages.20", 20)
            .await
            .unwrap();
        let second = svc
            .credit_purchase(&user, "tx-1", "messages.20", 20)
            .await
            .unwrap();
        assert_eq!(first, CreditOutcome::Applied);
        assert_eq!(second, CreditOutcome::AlreadyProcessed);

        let ent = svc.entitlements(&user).await.unwrap();
        assert_eq!(ent.paid_messages_left, 20);
        assert!(ent.is_using_paid);
        assert!(svc.is_transaction_processed(&user, "tx-1").await.unwrap());
    }
}
