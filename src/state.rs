//! Application state management
//!
//! Contains shared state accessible across all handlers. All storage is
//! backed by PostgreSQL; there are no in-memory fallbacks.

use crate::members::MemberService;
use crate::notifications::NotificationService;
use crate::wallet::{LedgerService, ProposalService, QuorumResolver, VoteService};
use deadpool_postgres::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Database connection pool (required)
    pub db_pool: Pool,

    /// Member account service
    pub members: MemberService,

    /// Notification inbox service
    pub notifications: NotificationService,

    /// Wallet ledger (append-only)
    pub ledger: LedgerService,

    /// Withdrawal request store
    pub proposals: ProposalService,

    /// Vote tally (one vote per request/member pair)
    pub votes: VoteService,

    /// Quorum resolver for the vote -> evaluate -> payout sequence
    pub quorum: QuorumResolver,
}

impl AppState {
    /// Create new application state with database pool (the only way)
    pub fn new(pool: Pool) -> Self {
        Self {
            members: MemberService::new(pool.clone()),
            notifications: NotificationService::new(pool.clone()),
            ledger: LedgerService::new(pool.clone()),
            proposals: ProposalService::new(pool.clone()),
            votes: VoteService::new(pool.clone()),
            quorum: QuorumResolver::new(pool.clone()),
            db_pool: pool,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
