/// Authentication endpoints
///
/// Login, registration, token refresh and rotation, logout, token
/// validation, and password change. Every response goes out in the
/// `ApiResponse` envelope.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::flow;
use crate::clients::ProfileClient;
use crate::error::{AppError, ValidationError};
use crate::response::ApiResponse;
use crate::token::{Claims, TokenCodec};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
    pub username: String,
    pub authenticated: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logged_out: bool,
}

#[derive(Deserialize)]
pub struct ValidateTokenRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct ValidateTokenResponse {
    pub valid: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// POST /auth/login
///
/// Authenticate with username-or-email and password; returns a fresh
/// access/refresh pair.
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let identifier = form
        .username
        .as_deref()
        .or(form.email.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ValidationError::EmptyField("username or email".to_string()))?;

    let (user, pair) = flow::login(&pool, &codec, identifier, &form.password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        username: user.username,
        user_id: user.id.to_string(),
    })))
}

/// POST /auth/register
///
/// Create the credential record and the profile record in the user-profile
/// collaborator.
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    profile_client: web::Data<ProfileClient>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let (user_id, username) = flow::register(
        &pool,
        &profile_client,
        flow::RegisterData {
            username: form.username,
            email: form.email,
            password: form.password,
            first_name: form.first_name,
            last_name: form.last_name,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::created(RegisterResponse {
        user_id: user_id.to_string(),
        username,
        authenticated: true,
    })))
}

/// POST /auth/refreshToken
///
/// Rotation-on-use: the presented refresh token is revoked and a new pair
/// issued; a second call with the same token fails.
pub async fn refresh_token(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let pair = flow::refresh(&pool, &codec, &form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(RefreshResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    })))
}

/// POST /auth/logout
///
/// Revokes both session tokens. Already-expired tokens are treated as
/// already logged out.
pub async fn logout(
    form: web::Json<LogoutRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    flow::logout(&pool, &codec, &form.access_token, &form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::ok(LogoutResponse { logged_out: true }).with_message("Logout successful"),
    ))
}

/// POST /auth/validateToken
///
/// Full validity check for an access token; the answer is the boolean,
/// never an error, for invalid input.
pub async fn validate_token(
    form: web::Json<ValidateTokenRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let valid = flow::validate_token(&pool, &codec, &form.token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ValidateTokenResponse { valid })))
}

/// POST /auth/changePassword (protected)
///
/// Identity comes from the bearer claims injected by the JWT guard.
/// Success invalidates every outstanding session of the user.
pub async fn change_password(
    claims: web::ReqData<Claims>,
    form: web::Json<ChangePasswordRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    flow::change_password(
        &pool,
        &claims,
        &form.old_password,
        &form.new_password,
        &form.confirm_new_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Password changed successfully")))
}
