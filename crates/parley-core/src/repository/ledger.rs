//! LedgerRepository trait definition.
//!
//! The entitlement ledger is the only contended shared mutable state in the
//! system. Debits and credits must be atomic single-row conditional updates
//! at the storage layer; balances can never go negative.

use parley_types::entitlement::{BalanceKind, CreditOutcome, Entitlements};
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for the per-user entitlement ledger.
pub trait LedgerRepository: Send + Sync {
    /// Create the ledger row for a fresh user with a starting free balance.
    fn init_ledger(
        &self,
        user_id: &Uuid,
        free_messages: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The user's current balances, or `None` when no ledger row exists.
    fn entitlements(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Entitlements>, RepositoryError>> + Send;

    /// Decrement one unit from the given balance.
    ///
    /// Must be a conditional update (`WHERE balance > 0`): returns `false`
    /// when the balance was already zero and nothing changed.
    fn debit(
        &self,
        user_id: &Uuid,
        kind: BalanceKind,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Credit `count` paid messages for a purchase, exactly once per
    /// transaction id.
    ///
    /// Recording the transaction and applying the credit must be one atomic
    /// unit. A transaction id seen before yields
    /// [`CreditOutcome::AlreadyProcessed`] and changes nothing.
    fn credit_paid_once(
        &self,
        user_id: &Uuid,
        transaction_id: &str,
        product_id: &str,
        count: i64,
    ) -> impl std::future::Future<Output = Result<CreditOutcome, RepositoryError>> + Send;

    /// Whether a transaction id has been reconciled for this user.
    fn is_transaction_processed(
        &self,
        user_id: &Uuid,
        transaction_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}

/// In-memory fake for unit tests across the crate.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use parley_types::entitlement::{BalanceKind, CreditOutcome, Entitlements};
    use parley_types::error::RepositoryError;
    use uuid::Uuid;

    use super::LedgerRepository;

    /// Clones share state, so a test can keep a handle while a service owns
    /// another.
    #[derive(Clone, Default)]
    pub struct FakeLedgerRepository {
        // user -> (free, paid, is_using_paid)
        rows: Arc<Mutex<HashMap<Uuid, (i64, i64, bool)>>>,
        // (user, transaction_id, product_id)
        processed: Arc<Mutex<Vec<(Uuid, String, String)>>>,
    }

    impl FakeLedgerRepository {
        pub fn seed(&self, user_id: Uuid, free: i64, paid: i64) {
            self.rows.lock().unwrap().insert(user_id, (free, paid, false));
        }
    }

    impl LedgerRepository for FakeLedgerRepository {
        async fn init_ledger(&self, user_id: &Uuid, free: i64) -> Result<(), RepositoryError> {
            self.rows.lock().unwrap().insert(*user_id, (free, 0, false));
            Ok(())
        }

        async fn entitlements(
            &self,
            user_id: &Uuid,
        ) -> Result<Option<Entitlements>, RepositoryError> {
            Ok(self.rows.lock().unwrap().get(user_id).map(|(free, paid, used)| {
                Entitlements {
                    user_id: *user_id,
                    free_messages_left: *free,
                    paid_messages_left: *paid,
                    is_using_paid: *used,
                }
            }))
        }

        async fn debit(&self, user_id: &Uuid, kind: BalanceKind) -> Result<bool, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.get_mut(user_id).ok_or(RepositoryError::NotFound)?;
            let balance = match kind {
                BalanceKind::Free => &mut row.0,
                BalanceKind::Paid => &mut row.1,
            };
            if *balance > 0 {
                *balance -= 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }

        async fn credit_paid_once(
            &self,
            user_id: &Uuid,
            transaction_id: &str,
            product_id: &str,
            count: i64,
        ) -> Result<CreditOutcome, RepositoryError> {
            let mut processed = self.processed.lock().unwrap();
            if processed.iter().any(|(_, tx, _)| tx == transaction_id) {
                return Ok(CreditOutcome::AlreadyProcessed);
            }
            let mut rows = self.rows.lock().unwrap();
            let row = rows.entry(*user_id).or_insert((0, 0, false));
            row.1 += count;
            row.2 = true;
            processed.push((*user_id, transaction_id.to_string(), product_id.to_string()));
            Ok(CreditOutcome::Applied)
        }

        async fn is_transaction_processed(
            &self,
            user_id: &Uuid,
            transaction_id: &str,
        ) -> Result<bool, RepositoryError> {
            Ok(self
                .processed
                .lock()
                .unwrap()
                .iter()
                .any(|(user, tx, _)| user == user_id && tx == transaction_id))
        }
    }
}
