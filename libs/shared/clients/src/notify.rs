use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::event::ScheduleEvent;

/// Fire-and-forget webhook publisher for schedule events.
///
/// Delivery is best-effort: publishing never blocks the calling request
/// and a failed delivery is logged and dropped, never rolled back.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    webhook_url: Arc<String>,
}

impl Notifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            webhook_url: Arc::new(config.notify_webhook_url.clone()),
        }
    }

    /// Dispatch an event to the configured webhook on a background task.
    pub fn publish(&self, event: ScheduleEvent) {
        if self.webhook_url.is_empty() {
            debug!("Notify webhook not configured, dropping event {}", event.name);
            return;
        }

        let client = self.client.clone();
        let url = self.webhook_url.clone();
        tokio::spawn(async move {
            let result = client.post(url.as_str()).json(&event).send().await;
            match result {
                Ok(response) if response.status().is_success() => {
                    debug!("Delivered event {} to webhook", event.name);
                }
                Ok(response) => {
                    warn!(
                        "Webhook rejected event {} with status {}",
                        event.name,
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("Failed to deliver event {}: {}", event.name, e);
                }
            }
        });
    }
}
