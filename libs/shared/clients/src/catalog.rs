use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::EngineError;

/// Catalog view of a bookable service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInfo {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: u32,
}

/// Read-only client for the service catalog collaborator. When no catalog
/// endpoint is configured, lookups return `None` and callers proceed
/// without enrichment.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.catalog_service_url.clone(),
        }
    }

    pub async fn get_service(&self, service_id: Uuid) -> Result<Option<ServiceInfo>, EngineError> {
        if self.base_url.is_empty() {
            debug!("Catalog service not configured, skipping lookup for {}", service_id);
            return Ok(None);
        }

        let url = format!("{}/services/{}", self.base_url, service_id);
        debug!("Fetching service {} from catalog", service_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::External(format!("catalog service unreachable: {}", e)))?;

        if response.status().as_u16() == 404 {
            return Err(EngineError::NotFound("service"));
        }
        if !response.status().is_success() {
            let status = response.status();
            error!("Catalog service error ({}) for service {}", status, service_id);
            return Err(EngineError::External(format!(
                "catalog service returned {}",
                status
            )));
        }

        let service: ServiceInfo = response
            .json()
            .await
            .map_err(|e| EngineError::External(format!("malformed catalog response: {}", e)))?;
        Ok(Some(service))
    }

    /// Verify the referenced service exists in the catalog. A no-op when
    /// the catalog is not configured.
    pub async fn ensure_service_exists(&self, service_id: Uuid) -> Result<(), EngineError> {
        self.get_service(service_id).await.map(|_| ())
    }
}
