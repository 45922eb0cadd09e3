/// Credential store
///
/// Persisted user records. Mutation is confined to login bookkeeping
/// (last login, failed attempts) and password change; identifiers are
/// assigned once at creation and never reused.
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Watermark for full-session invalidation: tokens issued before this
    /// instant are rejected everywhere.
    pub password_changed_at: DateTime<Utc>,
}

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

const SELECT_COLUMNS: &str = "id, username, email, password_hash, is_active, \
     failed_login_attempts, created_at, updated_at, last_login_at, password_changed_at";

/// Look up a credential by username or email in a single query; login
/// accepts either identifier.
pub async fn find_by_username_or_email(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<UserRecord>, AppError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE username = $1 OR email = $1",
        SELECT_COLUMNS
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<UserRecord>, AppError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn exists_by_username_or_email(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Create a credential record. The identifier is generated here, once;
/// the unique constraints on username and email backstop the duplicate
/// pre-check against races.
pub async fn insert(pool: &PgPool, new_user: NewUser) -> Result<Uuid, AppError> {
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, is_active,
                           failed_login_attempts, created_at, updated_at, password_changed_at)
        VALUES ($1, $2, $3, $4, true, 0, $5, $5, $5)
        "#,
    )
    .bind(user_id)
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(user_id)
}

pub async fn record_login_success(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET last_login_at = $1, failed_login_attempts = 0, updated_at = $1
        WHERE id = $2
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn record_login_failure(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET failed_login_attempts = failed_login_attempts + 1, updated_at = $1
        WHERE id = $2
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a new password hash and advance the invalidation watermark in
/// the same statement, so every token issued before the change dies with
/// the old hash.
pub async fn update_password_hash(pool: &PgPool, id: Uuid, hash: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1, password_changed_at = $2, updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(hash)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
