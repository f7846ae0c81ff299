//! SQLite ledger repository implementation.
//!
//! Debits are conditional single-row UPDATEs (`WHERE ... > 0`) so a balance
//! can never go negative under concurrent turns. Crediting a purchase and
//! recording its transaction id share one transaction; the UNIQUE
//! `transaction_id` column is the idempotency barrier.

use chrono::Utc;
use parley_core::repository::ledger::LedgerRepository;
use parley_types::entitlement::{BalanceKind, CreditOutcome, Entitlements};
use parley_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `LedgerRepository`.
pub struct SqliteLedgerRepository {
    pool: DatabasePool,
}

impl SqliteLedgerRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl LedgerRepository for SqliteLedgerRepository {
    async fn init_ledger(&self, user_id: &Uuid, free_messages: i64) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO user_credits (user_id, free_messages_left, paid_messages_left, is_using_paid, updated_at)
               VALUES (?, ?, 0, 0, ?)"#,
        )
        .bind(user_id.to_string())
        .bind(free_messages)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn entitlements(&self, user_id: &Uuid) -> Result<Option<Entitlements>, RepositoryError> {
        let row = sqlx::query(
            "SELECT free_messages_left, paid_messages_left, is_using_paid FROM user_credits WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let free: i64 = row
                    .try_get("free_messages_left")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let paid: i64 = row
                    .try_get("paid_messages_left")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let is_using_paid: bool = row
                    .try_get("is_using_paid")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(Entitlements {
                    user_id: *user_id,
                    free_messages_left: free,
                    paid_messages_left: paid,
                    is_using_paid,
                }))
            }
            None => Ok(None),
        }
    }

    async fn debit(&self, user_id: &Uuid, kind: BalanceKind) -> Result<bool, RepositoryError> {
        let query = match kind {
            BalanceKind::Free => {
                r#"UPDATE user_credits
                   SET free_messages_left = free_messages_left - 1, updated_at = ?
                   WHERE user_id = ? AND free_messages_left > 0"#
            }
            BalanceKind::Paid => {
                r#"UPDATE user_credits
                   SET paid_messages_left = paid_messages_left - 1, updated_at = ?
                   WHERE user_id = ? AND paid_messages_left > 0"#
            }
        };

        let result = sqlx::query(query)
            .bind(Utc::now().to_rfc3339())
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn credit_paid_once(
        &self,
        user_id: &Uuid,
        transaction_id: &str,
        product_id: &str,
        count: i64,
    ) -> Result<CreditOutcome, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // The marker insert is the barrier: a duplicate transaction id hits
        // the UNIQUE constraint and affects no rows.
        let marked = sqlx::query(
            r#"INSERT INTO processed_transactions (id, user_id, transaction_id, product_id, created_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(transaction_id) DO NOTHING"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id.to_string())
        .bind(transaction_id)
        .bind(product_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if marked.rows_affected() == 0 {
            return Ok(CreditOutcome::AlreadyProcessed);
        }

        let credited = sqlx::query(
            r#"UPDATE user_credits
               SET paid_messages_left = paid_messages_left + ?, is_using_paid = 1, updated_at = ?
               WHERE user_id = ?"#,
        )
        .bind(count)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if credited.rows_affected() == 0 {
            // No ledger row to credit: abort so the marker is not recorded
            // either and a later retry can succeed.
            return Err(RepositoryError::NotFound);
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(CreditOutcome::Applied)
    }

    async fn is_transaction_processed(
        &self,
        user_id: &Uuid,
        transaction_id: &str,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM processed_transactions WHERE transaction_id = ? AND user_id = ?) AS present",
        )
        .bind(transaction_id)
        .bind(user_id.to_string())
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let present: bool = row
            .try_get("present")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(present)
    }
}
