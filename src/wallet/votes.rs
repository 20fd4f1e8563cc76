//! Vote tally
//!
//! One vote per (request, member) pair, enforced by the unique constraint.
//! Existence is the whole payload: there is no weight, no rejection vote,
//! and no revocation once cast.

use crate::error::{is_foreign_key_violation, is_unique_violation, AppError};
use crate::wallet::models::VoteOutcome;
use deadpool_postgres::Pool;
use tracing::debug;

/// Vote service for database operations
pub struct VoteService {
    pool: Pool,
}

impl VoteService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Record a member's vote for a withdrawal request.
    ///
    /// A second vote from the same member trips the unique constraint and
    /// comes back as `Duplicate`; the tally is returned either way so the
    /// caller can report it.
    pub async fn cast_vote(
        &self,
        request_id: i32,
        voter_id: i32,
    ) -> Result<VoteOutcome, AppError> {
        let client = self.pool.get().await?;

        let inserted = match client
            .execute(
                "INSERT INTO votes (request_id, voter_id) VALUES ($1, $2)",
                &[&request_id, &voter_id],
            )
            .await
        {
            Ok(_) => true,
            Err(e) if is_unique_violation(&e) => {
                debug!("Duplicate vote by member {} on request {}", voter_id, request_id);
                false
            }
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(AppError::NotFound(format!(
                    "Withdrawal request {} not found",
                    request_id
                )));
            }
            Err(e) => return Err(AppError::Database(e)),
        };

        let votes: i64 = client
            .query_one(
                "SELECT COUNT(*) FROM votes WHERE request_id = $1",
                &[&request_id],
            )
            .await?
            .get(0);

        Ok(if inserted {
            VoteOutcome::Recorded { votes }
        } else {
            VoteOutcome::Duplicate { votes }
        })
    }
}
