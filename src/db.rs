//! Database connection management
//!
//! Handles connection pooling and schema bootstrap.

use crate::config::DatabaseConfig;
use crate::error::AppError;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::info;

/// Create a connection pool from the database configuration.
///
/// Hosted Postgres providers require TLS, so when the config demands it the
/// pool is built over rustls with native root certificates.
pub async fn create_pool(config: &DatabaseConfig) -> Result<Pool, AppError> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_pool_size));

    let pool = if config.require_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

        cfg.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| AppError::Config(format!("Failed to create TLS pool: {}", e)))?
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| AppError::Config(format!("Failed to create pool: {}", e)))?
    };

    // Verify the connection before handing the pool out
    let client = pool.get().await?;
    client.query_one("SELECT 1 AS ok", &[]).await?;
    drop(client);

    info!("Database connection successful (TLS: {})", config.require_tls);
    Ok(pool)
}

/// Create application tables if they don't exist.
pub async fn init_schema(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;

    client.execute(
        "CREATE TABLE IF NOT EXISTS members (
            id SERIAL PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            hobbies TEXT,
            bio TEXT,
            avatar_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        &[],
    ).await?;

    client.execute(
        "CREATE TABLE IF NOT EXISTS posts (
            id SERIAL PRIMARY KEY,
            author_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            image_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        &[],
    ).await?;

    client.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id SERIAL PRIMARY KEY,
            sender_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            recipient_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            body TEXT NOT NULL,
            is_read BOOLEAN NOT NULL DEFAULT false,
            sent_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        &[],
    ).await?;

    client.execute(
        "CREATE TABLE IF NOT EXISTS calendar_events (
            id SERIAL PRIMARY KEY,
            author_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            event_date DATE NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        &[],
    ).await?;

    client.execute(
        "CREATE TABLE IF NOT EXISTS notifications (
            id SERIAL PRIMARY KEY,
            member_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            body TEXT NOT NULL,
            kind TEXT NOT NULL,
            is_read BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        &[],
    ).await?;

    // Append-only: ledger rows outlive their member so the pooled balance
    // stays intact after an account deletion.
    client.execute(
        "CREATE TABLE IF NOT EXISTS ledger_entries (
            id SERIAL PRIMARY KEY,
            member_id INTEGER REFERENCES members(id) ON DELETE SET NULL,
            label TEXT NOT NULL,
            amount_cents BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        &[],
    ).await?;

    client.execute(
        "CREATE TABLE IF NOT EXISTS withdrawal_requests (
            id SERIAL PRIMARY KEY,
            requester_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
            reason TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        &[],
    ).await?;

    // The unique pair is what makes a duplicate vote a no-op
    client.execute(
        "CREATE TABLE IF NOT EXISTS votes (
            id SERIAL PRIMARY KEY,
            request_id INTEGER NOT NULL REFERENCES withdrawal_requests(id) ON DELETE CASCADE,
            voter_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            cast_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (request_id, voter_id)
        )",
        &[],
    ).await?;

    // Indexes for the hot read paths
    let _ = client.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_recipient_id ON messages(recipient_id)",
        &[],
    ).await;
    let _ = client.execute(
        "CREATE INDEX IF NOT EXISTS idx_notifications_member_id ON notifications(member_id)",
        &[],
    ).await;
    let _ = client.execute(
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_member_id ON ledger_entries(member_id)",
        &[],
    ).await;
    let _ = client.execute(
        "CREATE INDEX IF NOT EXISTS idx_votes_request_id ON votes(request_id)",
        &[],
    ).await;

    info!("Database tables initialized");
    Ok(())
}
