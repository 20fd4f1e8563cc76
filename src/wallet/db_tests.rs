//! Database-backed wallet workflow tests
//!
//! These drive the vote -> evaluate -> payout sequence against a real
//! Postgres, since the guarantees live in the unique pair constraint and
//! the conditional update, not in pure code. They are ignored by default;
//! point DATABASE_URL at a *disposable* database (tables get truncated)
//! and run:
//!
//! ```text
//! DATABASE_URL=postgresql://... cargo test -- --ignored
//! ```

use crate::config::Settings;
use crate::db;
use crate::members::MemberService;
use crate::wallet::{
    EvaluationOutcome, LedgerService, ProposalService, QuorumResolver, VoteOutcome, VoteService,
    PAYOUT_LABEL,
};
use deadpool_postgres::Pool;

async fn test_pool() -> Pool {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a disposable test database");
    let mut config = Settings::load().expect("settings load").database;
    config.max_pool_size = 4;
    let pool = db::create_pool(&config).await.expect("pool");
    db::init_schema(&pool).await.expect("schema");
    pool
}

async fn reset(pool: &Pool) {
    let client = pool.get().await.expect("client");
    client
        .batch_execute(
            "TRUNCATE members, posts, messages, calendar_events, notifications,
             ledger_entries, withdrawal_requests, votes RESTART IDENTITY CASCADE",
        )
        .await
        .expect("truncate");
}

async fn add_member(members: &MemberService, username: &str) -> i32 {
    members
        .create(username, "not-a-real-hash", None)
        .await
        .expect("member")
        .id
}

async fn payout_count(pool: &Pool) -> i64 {
    let client = pool.get().await.expect("client");
    client
        .query_one(
            "SELECT COUNT(*) FROM ledger_entries WHERE label = $1",
            &[&PAYOUT_LABEL],
        )
        .await
        .expect("count")
        .get(0)
}

#[tokio::test]
#[ignore]
async fn wallet_workflow_against_database() {
    let pool = test_pool().await;

    // The configured pool size must actually reach deadpool
    assert_eq!(pool.status().max_size, 4);

    reset(&pool).await;

    let members = MemberService::new(pool.clone());
    let ledger = LedgerService::new(pool.clone());
    let proposals = ProposalService::new(pool.clone());
    let votes = VoteService::new(pool.clone());
    let resolver = QuorumResolver::new(pool.clone());

    // Three-member squad with a funded pool
    let m1 = add_member(&members, "asha").await;
    let m2 = add_member(&members, "bert").await;
    let m3 = add_member(&members, "cleo").await;
    ledger.append(m1, "asha", 25_000).await.expect("contribution");
    assert_eq!(ledger.total_balance().await.unwrap(), 25_000);

    // One vote out of three is below quorum; nothing moves
    let request = proposals.create(m1, 10_000, "van rental").await.unwrap();
    assert_eq!(
        votes.cast_vote(request.id, m1).await.unwrap(),
        VoteOutcome::Recorded { votes: 1 }
    );
    assert_eq!(
        resolver.evaluate(request.id).await.unwrap(),
        EvaluationOutcome::BelowQuorum { votes: 1, members: 3 }
    );
    assert_eq!(ledger.total_balance().await.unwrap(), 25_000);
    assert_eq!(payout_count(&pool).await, 0);

    // The second vote reaches two thirds: approved, exactly one payout,
    // balance down by exactly the requested amount
    assert_eq!(
        votes.cast_vote(request.id, m2).await.unwrap(),
        VoteOutcome::Recorded { votes: 2 }
    );
    assert_eq!(
        resolver.evaluate(request.id).await.unwrap(),
        EvaluationOutcome::Approved { payout_cents: 10_000 }
    );
    let approved = proposals.get(request.id).await.unwrap().unwrap();
    assert_eq!(approved.status.as_str(), "approved");
    assert_eq!(ledger.total_balance().await.unwrap(), 15_000);
    assert_eq!(payout_count(&pool).await, 1);

    // A duplicate vote leaves the tally unchanged and evaluation is a
    // harmless no-op
    assert_eq!(
        votes.cast_vote(request.id, m2).await.unwrap(),
        VoteOutcome::Duplicate { votes: 2 }
    );
    assert_eq!(
        resolver.evaluate(request.id).await.unwrap(),
        EvaluationOutcome::AlreadyResolved
    );
    assert_eq!(payout_count(&pool).await, 1);

    // A fresh vote on an already-approved request records fine but the
    // ledger stays put
    assert_eq!(
        votes.cast_vote(request.id, m3).await.unwrap(),
        VoteOutcome::Recorded { votes: 3 }
    );
    assert_eq!(
        resolver.evaluate(request.id).await.unwrap(),
        EvaluationOutcome::AlreadyResolved
    );
    assert_eq!(ledger.total_balance().await.unwrap(), 15_000);
    assert_eq!(payout_count(&pool).await, 1);

    // Crash-retry seam: votes commit independently of evaluation, so a
    // request can reach quorum with no evaluation having run (the process
    // died in between). The retry surfaces as a duplicate vote and the
    // evaluation that follows it must still approve.
    let stuck = proposals.create(m2, 5_000, "speakers").await.unwrap();
    votes.cast_vote(stuck.id, m1).await.unwrap();
    votes.cast_vote(stuck.id, m2).await.unwrap();
    assert_eq!(
        votes.cast_vote(stuck.id, m2).await.unwrap(),
        VoteOutcome::Duplicate { votes: 2 }
    );
    assert_eq!(
        resolver.evaluate(stuck.id).await.unwrap(),
        EvaluationOutcome::Approved { payout_cents: 5_000 }
    );
    assert_eq!(payout_count(&pool).await, 2);

    // Two evaluations racing on the same quorum-met request: exactly one
    // wins the pending->approved flip, exactly one payout is appended
    let contested = proposals.create(m3, 2_500, "snacks").await.unwrap();
    votes.cast_vote(contested.id, m1).await.unwrap();
    votes.cast_vote(contested.id, m3).await.unwrap();
    let (a, b) = tokio::join!(
        resolver.evaluate(contested.id),
        resolver.evaluate(contested.id)
    );
    let outcomes = [a.unwrap(), b.unwrap()];
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, EvaluationOutcome::Approved { .. }))
            .count(),
        1,
        "exactly one evaluation may win: {:?}",
        outcomes
    );
    assert_eq!(payout_count(&pool).await, 3);

    // Requester-scoped delete: someone else's request and approved
    // requests are silent no-ops, your own pending one goes away
    let mine = proposals.create(m1, 1_000, "stickers").await.unwrap();
    assert!(!proposals.delete_own_pending(mine.id, m2).await.unwrap());
    assert!(proposals.get(mine.id).await.unwrap().is_some());
    assert!(!proposals.delete_own_pending(contested.id, m3).await.unwrap());
    assert!(proposals.delete_own_pending(mine.id, m1).await.unwrap());
    assert!(proposals.get(mine.id).await.unwrap().is_none());
}
