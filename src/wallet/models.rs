//! Wallet data models
//!
//! Ledger entries, withdrawal requests and vote outcomes.

use crate::error::AppError;
use crate::wallet::money::format_cents;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ledger label used for automatic payout entries (no member attached)
pub const PAYOUT_LABEL: &str = "SYSTEM_PAYOUT";

/// Status of a withdrawal request.
///
/// `pending -> approved` is the only transition and it is terminal; a
/// request that never reaches quorum stays pending until its requester
/// deletes it. There is no rejected state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Approved,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
        }
    }
}

impl TryFrom<&str> for ProposalStatus {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(ProposalStatus::Pending),
            "approved" => Ok(ProposalStatus::Approved),
            other => Err(AppError::Internal(format!(
                "Unknown withdrawal request status '{}'",
                other
            ))),
        }
    }
}

/// One immutable ledger row. Positive amounts are contributions,
/// negative amounts are payouts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i32,
    pub member_id: Option<i32>,
    pub label: String,
    pub amount_cents: i64,
    /// Decimal rendering of `amount_cents` for clients
    pub amount: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn from_row(row: &tokio_postgres::Row) -> Self {
        let amount_cents: i64 = row.get("amount_cents");
        Self {
            id: row.get("id"),
            member_id: row.get("member_id"),
            label: row.get("label"),
            amount_cents,
            amount: format_cents(amount_cents),
            created_at: row.get("created_at"),
        }
    }
}

/// A member's request to withdraw pooled funds
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: i32,
    pub requester_id: i32,
    pub amount_cents: i64,
    /// Decimal rendering of `amount_cents` for clients
    pub amount: String,
    pub reason: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

impl WithdrawalRequest {
    pub fn from_row(row: &tokio_postgres::Row) -> Result<Self, AppError> {
        let status: String = row.get("status");
        let amount_cents: i64 = row.get("amount_cents");
        Ok(Self {
            id: row.get("id"),
            requester_id: row.get("requester_id"),
            amount_cents,
            amount: format_cents(amount_cents),
            reason: row.get("reason"),
            status: ProposalStatus::try_from(status.as_str())?,
            created_at: row.get("created_at"),
        })
    }
}

/// Withdrawal request enriched with requester and tally, as shown in the
/// wallet overview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequestView {
    #[serde(flatten)]
    pub request: WithdrawalRequest,
    pub requester: String,
    pub votes: i64,
}

/// Result of recording a vote.
///
/// A duplicate is not an error: double-clicks and retries land here and the
/// caller reports it in the response body, never as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded { votes: i64 },
    Duplicate { votes: i64 },
}

impl VoteOutcome {
    pub fn votes(&self) -> i64 {
        match self {
            VoteOutcome::Recorded { votes } | VoteOutcome::Duplicate { votes } => *votes,
        }
    }
}

/// Result of a quorum evaluation after a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Not enough votes yet; the request stays pending
    BelowQuorum { votes: i64, members: i64 },
    /// This evaluation won the pending->approved transition and appended
    /// the payout entry
    Approved { payout_cents: i64 },
    /// Quorum was met but the request was no longer pending; nothing done
    AlreadyResolved,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(ProposalStatus::try_from("pending").unwrap(), ProposalStatus::Pending);
        assert_eq!(ProposalStatus::try_from("approved").unwrap(), ProposalStatus::Approved);
        assert!(ProposalStatus::try_from("rejected").is_err());
        assert_eq!(ProposalStatus::Approved.as_str(), "approved");
    }

    #[test]
    fn test_vote_outcome_exposes_tally() {
        assert_eq!(VoteOutcome::Recorded { votes: 3 }.votes(), 3);
        assert_eq!(VoteOutcome::Duplicate { votes: 2 }.votes(), 2);
    }

    #[test]
    fn test_withdrawal_request_serializes_amount_as_decimal() {
        let request = WithdrawalRequest {
            id: 1,
            requester_id: 2,
            amount_cents: 10_000,
            amount: format_cents(10_000),
            reason: "van rental".to_string(),
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["amount"], "100.00");
        assert_eq!(json["amountCents"], 10_000);
        assert_eq!(json["status"], "pending");
    }
}
