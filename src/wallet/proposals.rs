//! Withdrawal request store
//!
//! Creation, listing and requester-scoped deletion of withdrawal requests.
//! Status changes are the quorum resolver's job alone.

use crate::error::AppError;
use crate::wallet::models::{WithdrawalRequest, WithdrawalRequestView};
use deadpool_postgres::Pool;

/// Withdrawal request service for database operations
pub struct ProposalService {
    pool: Pool,
}

impl ProposalService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a pending withdrawal request
    pub async fn create(
        &self,
        requester_id: i32,
        amount_cents: i64,
        reason: &str,
    ) -> Result<WithdrawalRequest, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                "INSERT INTO withdrawal_requests (requester_id, amount_cents, reason)
                 VALUES ($1, $2, $3)
                 RETURNING id, requester_id, amount_cents, reason, status, created_at",
                &[&requester_id, &amount_cents, &reason],
            )
            .await?;

        WithdrawalRequest::from_row(&row)
    }

    pub async fn get(&self, id: i32) -> Result<Option<WithdrawalRequest>, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_opt(
                "SELECT id, requester_id, amount_cents, reason, status, created_at
                 FROM withdrawal_requests WHERE id = $1",
                &[&id],
            )
            .await?;

        row.as_ref().map(WithdrawalRequest::from_row).transpose()
    }

    /// All requests newest-first, with requester username and vote tally
    pub async fn list_with_votes(&self) -> Result<Vec<WithdrawalRequestView>, AppError> {
        let client = self.pool.get().await?;

        let rows = client
            .query(
                "SELECT w.id, w.requester_id, w.amount_cents, w.reason, w.status,
                        w.created_at, m.username AS requester,
                        (SELECT COUNT(*) FROM votes v WHERE v.request_id = w.id) AS votes
                 FROM withdrawal_requests w
                 JOIN members m ON m.id = w.requester_id
                 ORDER BY w.id DESC",
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(WithdrawalRequestView {
                    request: WithdrawalRequest::from_row(row)?,
                    requester: row.get("requester"),
                    votes: row.get("votes"),
                })
            })
            .collect()
    }

    /// Delete a request if it belongs to the caller and is still pending.
    ///
    /// The ownership and status checks live in the WHERE clause, so deleting
    /// someone else's request (or an approved one) is a silent no-op rather
    /// than a forbidden error. Returns whether a row was removed.
    pub async fn delete_own_pending(
        &self,
        request_id: i32,
        requester_id: i32,
    ) -> Result<bool, AppError> {
        let client = self.pool.get().await?;

        let affected = client
            .execute(
                "DELETE FROM withdrawal_requests
                 WHERE id = $1 AND requester_id = $2 AND status = 'pending'",
                &[&request_id, &requester_id],
            )
            .await?;

        Ok(affected == 1)
    }
}
