use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::notifier::{NotificationError, Notifier};
use crate::database::models::Alert;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts alerts to an HTTP endpoint as a flat JSON document.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, url: url.into() }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotificationError> {
        let raised_at: DateTime<Utc> = alert.raised_at.into();

        let payload = json!({
            "source": "xrmon",
            "kind": alert.kind.to_string(),
            "subsystem": alert.service.subsystem,
            "service": alert.service.service,
            "message": alert.message,
            "resolved": alert.resolved,
            "timestamp": raised_at.to_rfc3339(),
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Webhook(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Webhook(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        debug!(url = %self.url, "webhook delivered");
        Ok(())
    }
}
