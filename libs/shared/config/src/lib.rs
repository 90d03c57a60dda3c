use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub identity_service_url: String,
    pub catalog_service_url: String,
    pub notify_webhook_url: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            identity_service_url: env::var("IDENTITY_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("IDENTITY_SERVICE_URL not set, reference checks disabled");
                    String::new()
                }),
            catalog_service_url: env::var("CATALOG_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("CATALOG_SERVICE_URL not set, service catalog lookups disabled");
                    String::new()
                }),
            notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL")
                .unwrap_or_else(|_| {
                    warn!("NOTIFY_WEBHOOK_URL not set, notifications disabled");
                    String::new()
                }),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_fully_configured() {
            warn!("Application not fully configured - some collaborator integrations are disabled");
        }

        config
    }

    /// True when every external collaborator has an endpoint configured.
    pub fn is_fully_configured(&self) -> bool {
        self.has_identity_service() && self.has_catalog_service() && self.has_notify_webhook()
    }

    pub fn has_identity_service(&self) -> bool {
        !self.identity_service_url.is_empty()
    }

    pub fn has_catalog_service(&self) -> bool {
        !self.catalog_service_url.is_empty()
    }

    pub fn has_notify_webhook(&self) -> bool {
        !self.notify_webhook_url.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            identity_service_url: String::new(),
            catalog_service_url: String::new(),
            notify_webhook_url: String::new(),
            server_port: 3000,
        }
    }
}
