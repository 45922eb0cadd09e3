/// Client for the user-profile collaborator. Registration creates the
/// profile record through this call.
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::configuration::UserProfileSettings;

#[derive(Clone)]
pub struct ProfileClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct CreateProfileRequest<'a> {
    user_id: String,
    username: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
}

impl ProfileClient {
    pub fn new(settings: &UserProfileSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }

    pub async fn create_profile(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<(), String> {
        let url = format!("{}/internal/users", self.base_url);
        let request = CreateProfileRequest {
            user_id: user_id.to_string(),
            username,
            email,
            first_name,
            last_name,
        };

        self.http_client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to reach user-profile service");
                format!("Failed to reach user-profile service: {}", e)
            })?
            .error_for_status()
            .map_err(|e| {
                tracing::error!(error = %e, "User-profile service returned error");
                format!("User-profile service error: {}", e)
            })?;

        Ok(())
    }
}
