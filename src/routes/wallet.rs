//! Shared wallet route handlers
//!
//! Contributions, withdrawal requests, voting and the quorum-triggered
//! payout. The vote -> evaluate -> payout sequence is the one path in the
//! application with real state-machine behavior; everything transactional
//! lives in `wallet::quorum`, this module just wires it to HTTP.

use crate::auth::Claims;
use crate::error::{ApiResult, AppError};
use crate::models::{MessageResponse, SuccessResponse};
use crate::notifications::KIND_MONEY_REQUEST;
use crate::state::SharedState;
use crate::wallet::{
    format_cents, parse_amount_cents, EvaluationOutcome, LedgerEntry, VoteOutcome,
    WithdrawalRequest, WithdrawalRequestView,
};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct ContributeRequest {
    /// Decimal amount, e.g. "25" or "19.99"
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequestBody {
    pub amount: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOverview {
    pub total_balance: String,
    pub total_balance_cents: i64,
    pub personal_balance: String,
    pub personal_balance_cents: i64,
    pub member_count: i64,
    pub history: Vec<LedgerEntry>,
    pub requests: Vec<WithdrawalRequestView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub success: bool,
    /// false when this member had already voted (silent no-op)
    pub recorded: bool,
    pub votes: i64,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<String>,
}

// ============================================
// Route Handlers
// ============================================

/// GET /api/wallet
///
/// The wallet view: balances, recent ledger history, every withdrawal
/// request with its tally, and the membership size the quorum is measured
/// against. Visiting the wallet marks money-request notifications read.
pub async fn overview(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse<WalletOverview>>> {
    state
        .notifications
        .mark_read(claims.sub, KIND_MONEY_REQUEST)
        .await?;

    let total = state.ledger.total_balance().await?;
    let personal = state.ledger.personal_balance(claims.sub).await?;
    let history = state.ledger.recent(5).await?;
    let requests = state.proposals.list_with_votes().await?;
    let member_count = state.members.count().await?;

    Ok(Json(SuccessResponse::with_data(
        "Wallet fetched.",
        WalletOverview {
            total_balance: format_cents(total),
            total_balance_cents: total,
            personal_balance: format_cents(personal),
            personal_balance_cents: personal,
            member_count,
            history,
            requests,
        },
    )))
}

/// POST /api/wallet/contributions
///
/// Pitch into the pool. The amount is validated before anything is written.
pub async fn contribute(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ContributeRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<LedgerEntry>>), AppError> {
    let amount_cents = parse_amount_cents(&req.amount)?;

    let entry = state
        .ledger
        .append(claims.sub, &claims.username, amount_cents)
        .await?;

    info!(
        "Member {} contributed {} to the pool",
        claims.sub,
        format_cents(amount_cents)
    );

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Contribution recorded.", entry)),
    ))
}

/// POST /api/wallet/withdrawals
///
/// Create a withdrawal request and notify the rest of the squad.
pub async fn request_withdrawal(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<WithdrawalRequestBody>,
) -> Result<(StatusCode, Json<SuccessResponse<WithdrawalRequest>>), AppError> {
    let amount_cents = parse_amount_cents(&req.amount)?;
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("A reason is required".to_string()));
    }

    let request = state
        .proposals
        .create(claims.sub, amount_cents, reason)
        .await?;

    state
        .notifications
        .fan_out_to_others(
            claims.sub,
            KIND_MONEY_REQUEST,
            &format!("{} requested money!", claims.username),
        )
        .await?;

    info!(
        "Member {} requested withdrawal of {} (request {})",
        claims.sub,
        format_cents(amount_cents),
        request.id
    );

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Withdrawal requested.", request)),
    ))
}

/// POST /api/wallet/withdrawals/{id}/vote
///
/// Cast the caller's vote, then re-evaluate quorum. A duplicate vote gets
/// the same 200 as a fresh one - the body says which it was, but a
/// double-click never surfaces as an error. Voting on an already-approved
/// request records the vote and changes nothing else.
pub async fn vote(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<i32>,
) -> ApiResult<Json<VoteResponse>> {
    let outcome = state.votes.cast_vote(request_id, claims.sub).await?;

    if let VoteOutcome::Duplicate { votes } = outcome {
        debug!(
            "Member {} re-voted on request {} ({} votes)",
            claims.sub, request_id, votes
        );
    }

    // Evaluation runs even for a duplicate vote. The vote commits in its
    // own transaction, so a request can die between the cast and the
    // evaluation; the retry then comes back as a duplicate and must still
    // be able to approve a quorum-met request.
    let evaluation = state.quorum.evaluate(request_id).await?;

    let (status, payout) = match evaluation {
        EvaluationOutcome::Approved { payout_cents } => {
            ("approved", Some(format_cents(-payout_cents)))
        }
        EvaluationOutcome::BelowQuorum { .. } => ("pending", None),
        EvaluationOutcome::AlreadyResolved => {
            // Report the durable status rather than guessing
            let current = state
                .proposals
                .get(request_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Withdrawal request {} not found", request_id))
                })?;
            (current.status.as_str(), None)
        }
    };

    Ok(Json(VoteResponse {
        success: true,
        recorded: matches!(outcome, VoteOutcome::Recorded { .. }),
        votes: outcome.votes(),
        status,
        payout,
    }))
}

/// DELETE /api/wallet/withdrawals/{id}
///
/// Withdraw your own request while it is still pending. Anything else -
/// someone else's request, an approved one, a stale id - is a silent no-op.
pub async fn delete_withdrawal(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = state
        .proposals
        .delete_own_pending(request_id, claims.sub)
        .await?;

    let message = if removed {
        "Withdrawal request deleted."
    } else {
        "Nothing to delete."
    };

    Ok(Json(MessageResponse::new(message)))
}
