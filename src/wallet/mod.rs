//! Shared wallet
//!
//! The pooled group wallet: an append-only ledger of contributions and
//! payouts, withdrawal requests, a one-vote-per-member tally, and the
//! quorum resolver that releases funds once two thirds of the squad agree.

pub mod ledger;
pub mod models;
pub mod money;
pub mod proposals;
pub mod quorum;
pub mod votes;

#[cfg(test)]
mod db_tests;

pub use ledger::LedgerService;
pub use models::{
    EvaluationOutcome, LedgerEntry, ProposalStatus, VoteOutcome, WithdrawalRequest,
    WithdrawalRequestView, PAYOUT_LABEL,
};
pub use money::{format_cents, parse_amount_cents};
pub use proposals::ProposalService;
pub use quorum::{quorum_met, QuorumResolver};
pub use votes::VoteService;
