use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::EngineError;

/// Minimal view of a user returned by the identity collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    pub role: String,
    pub status: String,
}

/// Read-only client for the identity collaborator, used to validate that
/// referenced staff/client ids exist and are active. When no identity
/// endpoint is configured the checks are skipped.
pub struct IdentityClient {
    client: Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.identity_service_url.clone(),
        }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<IdentityUser>, EngineError> {
        if self.base_url.is_empty() {
            debug!("Identity service not configured, skipping lookup for {}", user_id);
            return Ok(None);
        }

        let url = format!("{}/users/{}", self.base_url, user_id);
        debug!("Fetching user {} from identity service", user_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::External(format!("identity service unreachable: {}", e)))?;

        if response.status().as_u16() == 404 {
            return Err(EngineError::NotFound("user"));
        }
        if !response.status().is_success() {
            let status = response.status();
            error!("Identity service error ({}) for user {}", status, user_id);
            return Err(EngineError::External(format!(
                "identity service returned {}",
                status
            )));
        }

        let user: IdentityUser = response
            .json()
            .await
            .map_err(|e| EngineError::External(format!("malformed identity response: {}", e)))?;
        Ok(Some(user))
    }

    /// Verify the referenced user exists, carries the expected role, and is
    /// active. A no-op when the identity service is not configured.
    pub async fn ensure_active_user(
        &self,
        user_id: Uuid,
        expected_role: &str,
    ) -> Result<(), EngineError> {
        let Some(user) = self.get_user(user_id).await? else {
            return Ok(());
        };

        if !user.role.eq_ignore_ascii_case(expected_role) {
            return Err(EngineError::validation(format!(
                "user {} has role {}, expected {}",
                user_id, user.role, expected_role
            )));
        }
        if !user.status.eq_ignore_ascii_case("active") {
            return Err(EngineError::validation(format!(
                "user {} is not active",
                user_id
            )));
        }
        Ok(())
    }
}
