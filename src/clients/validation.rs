/// Gateway-side client for the auth service's validateToken operation.
/// The call carries a bounded timeout; callers treat any failure as
/// unauthenticated (fail closed).
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
pub struct ValidationClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ValidateTokenRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct ValidateTokenEnvelope {
    result: Option<ValidateTokenResult>,
}

#[derive(Deserialize)]
struct ValidateTokenResult {
    valid: bool,
}

impl ValidationClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Ask the auth service whether the token is valid. Network failure and
    /// timeout surface as errors; the gateway filter collapses them to
    /// unauthenticated.
    pub async fn validate(&self, token: &str) -> Result<bool, String> {
        let url = format!("{}/auth/validateToken", self.base_url);

        let envelope: ValidateTokenEnvelope = self
            .http_client
            .post(&url)
            .timeout(self.timeout)
            .json(&ValidateTokenRequest { token })
            .send()
            .await
            .map_err(|e| format!("Validation call failed: {}", e))?
            .error_for_status()
            .map_err(|e| format!("Validation call returned error: {}", e))?
            .json()
            .await
            .map_err(|e| format!("Validation response unreadable: {}", e))?;

        Ok(envelope.result.map(|r| r.valid).unwrap_or(false))
    }
}
