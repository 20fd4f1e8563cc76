//! Shared wallet ledger
//!
//! Append-only record of money moving in and out of the pool. No code path
//! anywhere updates or deletes a ledger row; balances are derived by
//! summing, which is fine at squad scale.

use crate::error::AppError;
use crate::wallet::models::LedgerEntry;
use deadpool_postgres::Pool;

/// Ledger service for database operations
pub struct LedgerService {
    pool: Pool,
}

impl LedgerService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Append an entry. Contributions carry the contributing member and a
    /// positive amount; payouts are appended by the quorum resolver inside
    /// its own transaction, not through here.
    pub async fn append(
        &self,
        member_id: i32,
        label: &str,
        amount_cents: i64,
    ) -> Result<LedgerEntry, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                "INSERT INTO ledger_entries (member_id, label, amount_cents)
                 VALUES ($1, $2, $3)
                 RETURNING id, member_id, label, amount_cents, created_at",
                &[&member_id, &label, &amount_cents],
            )
            .await?;

        Ok(LedgerEntry::from_row(&row))
    }

    /// Sum of every entry, in cents
    pub async fn total_balance(&self) -> Result<i64, AppError> {
        let client = self.pool.get().await?;

        // SUM(bigint) comes back as numeric, so cast it down
        let row = client
            .query_one(
                "SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM ledger_entries",
                &[],
            )
            .await?;

        Ok(row.get(0))
    }

    /// Sum of one member's entries, in cents
    pub async fn personal_balance(&self, member_id: i32) -> Result<i64, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                "SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM ledger_entries
                 WHERE member_id = $1",
                &[&member_id],
            )
            .await?;

        Ok(row.get(0))
    }

    /// Latest entries for the wallet view
    pub async fn recent(&self, limit: i64) -> Result<Vec<LedgerEntry>, AppError> {
        let client = self.pool.get().await?;

        let rows = client
            .query(
                "SELECT id, member_id, label, amount_cents, created_at
                 FROM ledger_entries ORDER BY id DESC LIMIT $1",
                &[&limit],
            )
            .await?;

        Ok(rows.iter().map(LedgerEntry::from_row).collect())
    }
}
