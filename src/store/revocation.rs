/// Revocation store
///
/// Durable set of revoked token identifiers. A jti inserted here stays
/// invalid for the remainder of its natural expiry window; a periodic
/// sweep deletes entries once that window has passed. Inserts are
/// idempotent on the primary key, so a duplicate revocation never
/// corrupts state.
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::error::AppError;

/// True if the token identifier has been revoked.
pub async fn contains(pool: &PgPool, token_id: &str) -> Result<bool, AppError> {
    let revoked = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM invalidated_tokens WHERE token_id = $1)",
    )
    .bind(token_id)
    .fetch_one(pool)
    .await?;

    Ok(revoked)
}

/// Revoke a token identifier until `expires_at`. Returns whether the row
/// was newly inserted; `false` means a concurrent caller revoked the same
/// id first. Takes any executor so refresh rotation can run it inside its
/// transaction.
pub async fn add<'e>(
    executor: impl PgExecutor<'e>,
    token_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO invalidated_tokens (token_id, expires_at)
        VALUES ($1, $2)
        ON CONFLICT (token_id) DO NOTHING
        "#,
    )
    .bind(token_id)
    .bind(expires_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete revocation records whose expiry has passed. Off the hot path;
/// safe to run concurrently with inserts.
pub async fn sweep_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM invalidated_tokens WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected();
    if deleted > 0 {
        tracing::info!(deleted, "Swept expired revocation records");
    }

    Ok(deleted)
}
