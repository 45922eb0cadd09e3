/// Response envelope shared by every endpoint.
///
/// Carries an application-level numeric code alongside the transport status:
/// 200-family for success, 400 for validation errors, 401 for authentication
/// failures, 404 for not-found, 409 for duplicates, 500 for anything else.
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            code: 200,
            message: None,
            result: Some(result),
        }
    }

    pub fn created(result: T) -> Self {
        Self {
            code: 201,
            message: None,
            result: Some(result),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: Some(message.into()),
            result: None,
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            result: None,
        }
    }
}
