/// Auth flow orchestration
///
/// Drives a token's lifecycle ({issued} -> {in-use} -> {revoked | expired})
/// over the token codec, credential store, and revocation store. Each
/// operation is a point-in-time transaction; no refresh chaining state is
/// tracked anywhere.
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::clients::ProfileClient;
use crate::error::{AppError, AuthError};
use crate::store::{credentials, revocation, NewUser, UserRecord};
use crate::token::{Claims, TokenCodec, TokenError, TokenKind};
use crate::validators::{is_valid_email, is_valid_username};

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

fn issue_pair(codec: &TokenCodec, user_id: Uuid) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: codec.issue(user_id, TokenKind::Access)?,
        refresh_token: codec.issue(user_id, TokenKind::Refresh)?,
    })
}

/// Whether the token predates the user's password-change watermark.
/// Tokens issued before the last password change are dead regardless of
/// their individual revocation state.
fn predates_password_change(claims: &Claims, user: &UserRecord) -> bool {
    claims.iat < user.password_changed_at.timestamp()
}

/// Authenticate by username-or-email and password; issues a fresh
/// access/refresh pair on success.
pub async fn login(
    pool: &PgPool,
    codec: &TokenCodec,
    identifier: &str,
    password: &str,
) -> Result<(UserRecord, TokenPair), AppError> {
    let user = credentials::find_by_username_or_email(pool, identifier)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Login attempt on inactive account");
        return Err(AuthError::InvalidCredentials.into());
    }

    if !verify_password(password, &user.password_hash).await? {
        credentials::record_login_failure(pool, user.id).await?;
        tracing::warn!(user_id = %user.id, "Login failed: password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }

    credentials::record_login_success(pool, user.id).await?;
    let pair = issue_pair(codec, user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok((user, pair))
}

/// Create a credential record and the corresponding profile record in the
/// user-profile collaborator.
pub async fn register(
    pool: &PgPool,
    profile_client: &ProfileClient,
    data: RegisterData,
) -> Result<(Uuid, String), AppError> {
    let username = is_valid_username(&data.username)?;
    let email = is_valid_email(&data.email)?;
    let password_hash = hash_password(&data.password).await?;

    if credentials::exists_by_username_or_email(pool, &username, &email).await? {
        return Err(AuthError::DuplicateUsernameOrEmail.into());
    }

    let user_id = credentials::insert(
        pool,
        NewUser {
            username: username.clone(),
            email: email.clone(),
            password_hash,
        },
    )
    .await
    .map_err(|e| match e {
        // Race with a concurrent registration; the unique constraint wins
        AppError::Database(crate::error::DatabaseError::UniqueConstraintViolation(_)) => {
            AuthError::DuplicateUsernameOrEmail.into()
        }
        other => other,
    })?;

    profile_client
        .create_profile(
            user_id,
            &username,
            &email,
            data.first_name.as_deref(),
            data.last_name.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Profile creation failed");
            AppError::Uncategorized("Failed to create user profile".to_string())
        })?;

    tracing::info!(user_id = %user_id, "User registered");
    Ok((user_id, username))
}

/// Rotate a refresh token: revoke the presented token and issue a fresh
/// pair, as one transaction. The revocation commits before the new pair is
/// returned, so a concurrent replay of the old token is reliably rejected;
/// if anything fails after the revocation insert, the transaction rolls it
/// back and the old token is not half-burned.
pub async fn refresh(
    pool: &PgPool,
    codec: &TokenCodec,
    old_refresh_token: &str,
) -> Result<TokenPair, AppError> {
    let claims = codec.verify(old_refresh_token, TokenKind::Refresh)?;

    if revocation::contains(pool, &claims.jti).await? {
        tracing::warn!(jti = %claims.jti, "Attempt to reuse a rotated refresh token");
        return Err(AuthError::AuthenticationRequired.into());
    }

    let user_id = claims.user_id()?;
    let expires_at = codec.effective_expires_at(&claims, TokenKind::Refresh);

    let mut tx = pool.begin().await?;

    // The insert is the authoritative single-use guard: the check above is
    // only a fast path, and a concurrent rotation of the same token makes
    // the conflicting insert affect zero rows. That rotation loses.
    if !revocation::add(&mut tx, &claims.jti, expires_at).await? {
        tracing::warn!(jti = %claims.jti, "Refresh token revoked by a concurrent rotation");
        return Err(AuthError::AuthenticationRequired.into());
    }

    let user = credentials::find_by_id(&mut tx, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AuthError::UserNotFound)?;

    if predates_password_change(&claims, &user) {
        return Err(AuthError::AuthenticationRequired.into());
    }

    let pair = issue_pair(codec, user.id)?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, "Refresh token rotated");
    Ok(pair)
}

/// Revoke both tokens of a session. A token that already expired naturally
/// is treated as already revoked (logged, not an error); malformed or
/// unsigned input still fails hard.
pub async fn logout(
    pool: &PgPool,
    codec: &TokenCodec,
    access_token: &str,
    refresh_token: &str,
) -> Result<(), AppError> {
    revoke_if_live(pool, codec, access_token, TokenKind::Access).await?;
    revoke_if_live(pool, codec, refresh_token, TokenKind::Refresh).await?;

    tracing::info!("Session logged out");
    Ok(())
}

async fn revoke_if_live(
    pool: &PgPool,
    codec: &TokenCodec,
    token: &str,
    kind: TokenKind,
) -> Result<(), AppError> {
    match codec.verify(token, kind) {
        Ok(claims) => {
            let expires_at = codec.effective_expires_at(&claims, kind);
            // Already revoked is fine here; logout is idempotent
            revocation::add(pool, &claims.jti, expires_at).await?;
            Ok(())
        }
        Err(TokenError::Expired) => {
            tracing::info!("Token already expired; treating as revoked");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Full validity check for an access token: signature and expiry, the
/// revocation set, and the account's password-change watermark. Invalid
/// input yields `false`, never an error.
pub async fn validate_token(
    pool: &PgPool,
    codec: &TokenCodec,
    token: &str,
) -> Result<bool, AppError> {
    let claims = match codec.verify(token, TokenKind::Access) {
        Ok(claims) => claims,
        Err(_) => return Ok(false),
    };

    if revocation::contains(pool, &claims.jti).await? {
        return Ok(false);
    }

    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(_) => return Ok(false),
    };

    let user = match credentials::find_by_id(pool, user_id).await? {
        Some(user) if user.is_active => user,
        _ => return Ok(false),
    };

    Ok(!predates_password_change(&claims, &user))
}

/// Change the password for the authenticated user. Persisting the new hash
/// also advances the password-change watermark, invalidating every token
/// issued before this instant (password change is a trust boundary).
pub async fn change_password(
    pool: &PgPool,
    claims: &Claims,
    old_password: &str,
    new_password: &str,
    confirm_new_password: &str,
) -> Result<(), AppError> {
    let user_id = claims.user_id()?;
    let user = credentials::find_by_id(pool, user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !verify_password(old_password, &user.password_hash).await? {
        return Err(AuthError::InvalidCredentials.into());
    }

    if new_password != confirm_new_password {
        return Err(AuthError::PasswordsDoNotMatch.into());
    }

    if new_password == old_password {
        return Err(AuthError::NewPasswordSameAsOld.into());
    }

    let new_hash = hash_password(new_password).await?;
    credentials::update_password_hash(pool, user.id, &new_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed; all outstanding sessions invalidated");
    Ok(())
}
