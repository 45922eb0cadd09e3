/// Unified error handling for the service.
///
/// Domain-specific error enums map into a single `AppError`, which renders
/// through `ResponseError` into the standard `ApiResponse` envelope with a
/// stable application-level numeric code. Nothing is silently swallowed
/// except the deliberate fail-soft case in logout (an already-expired token
/// is treated as already logged out).
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

use crate::response::ApiResponse;
use crate::token::TokenError;

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    SuspiciousContent(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Authentication and token lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    UserNotFound,
    InvalidCredentials,
    DuplicateUsernameOrEmail,
    AuthenticationRequired,
    InvalidToken,
    PasswordsDoNotMatch,
    NewPasswordSameAsOld,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::UserNotFound => write!(f, "User or email address does not exist"),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::DuplicateUsernameOrEmail => {
                write!(f, "The username or email address is already registered")
            }
            AuthError::AuthenticationRequired => {
                write!(f, "Authentication is required to access this resource")
            }
            AuthError::InvalidToken => write!(f, "The token is invalid"),
            AuthError::PasswordsDoNotMatch => write!(f, "Passwords do not match"),
            AuthError::NewPasswordSameAsOld => {
                write!(f, "New password must differ from the old password")
            }
        }
    }
}

impl StdError for AuthError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Uncategorized(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Uncategorized(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => AppError::Auth(AuthError::InvalidToken),
            TokenError::Signature | TokenError::Expired => {
                AppError::Auth(AuthError::AuthenticationRequired)
            }
            TokenError::Creation(msg) => AppError::Uncategorized(msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return AppError::Database(DatabaseError::NotFound("Record not found".to_string()));
        }

        let error_msg = err.to_string();
        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Username or email already registered".to_string(),
            ))
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            AppError::Database(DatabaseError::ConnectionPool(error_msg))
        } else {
            AppError::Database(DatabaseError::UnexpectedError(error_msg))
        }
    }
}

impl AppError {
    /// Application-level numeric code carried in the response envelope.
    pub fn app_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => 409,
            AppError::Database(DatabaseError::NotFound(_)) => 404,
            AppError::Database(_) => 500,
            AppError::Auth(e) => match e {
                AuthError::UserNotFound => 404,
                AuthError::DuplicateUsernameOrEmail => 409,
                AuthError::PasswordsDoNotMatch | AuthError::NewPasswordSameAsOld => 400,
                AuthError::InvalidCredentials
                | AuthError::AuthenticationRequired
                | AuthError::InvalidToken => 401,
            },
            AppError::Uncategorized(_) => 500,
        }
    }

    /// Message exposed to callers. Authentication failures stay generic;
    /// internal failure detail never crosses the boundary.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                AuthError::DuplicateUsernameOrEmail.to_string()
            }
            AppError::Database(DatabaseError::NotFound(msg)) => msg.clone(),
            AppError::Database(_) => "Service temporarily unavailable".to_string(),
            AppError::Auth(e) => e.to_string(),
            AppError::Uncategorized(_) => "An unexpected error occurred".to_string(),
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "Validation error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error = %e, "Authentication error");
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
            }
            AppError::Uncategorized(msg) => {
                tracing::error!(error = %msg, "Uncategorized error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.app_code() {
            400 => StatusCode::BAD_REQUEST,
            401 => StatusCode::UNAUTHORIZED,
            404 => StatusCode::NOT_FOUND,
            409 => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code())
            .json(ApiResponse::error(self.app_code(), self.public_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_expected_codes() {
        assert_eq!(AppError::Auth(AuthError::UserNotFound).app_code(), 404);
        assert_eq!(AppError::Auth(AuthError::InvalidCredentials).app_code(), 401);
        assert_eq!(
            AppError::Auth(AuthError::DuplicateUsernameOrEmail).app_code(),
            409
        );
        assert_eq!(
            AppError::Auth(AuthError::AuthenticationRequired).app_code(),
            401
        );
        assert_eq!(
            AppError::Auth(AuthError::NewPasswordSameAsOld).app_code(),
            400
        );
    }

    #[test]
    fn token_errors_convert_into_auth_errors() {
        let malformed: AppError = TokenError::Malformed.into();
        match malformed {
            AppError::Auth(AuthError::InvalidToken) => (),
            other => panic!("Expected InvalidToken, got {:?}", other),
        }

        let expired: AppError = TokenError::Expired.into();
        match expired {
            AppError::Auth(AuthError::AuthenticationRequired) => (),
            other => panic!("Expected AuthenticationRequired, got {:?}", other),
        }
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.app_code(), 404);
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::TooShort("username".to_string(), 3);
        assert_eq!(err.to_string(), "username is too short (minimum 3 characters)");
    }
}
