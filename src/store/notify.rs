use async_trait::async_trait;
use serde_json::json;

use crate::deletion::Notifier;
use crate::error::StoreError;

/// Posts admin actions to a chat webhook (Discord compatible payload).
#[derive(Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), StoreError> {
        self.http
            .post(&self.url)
            .json(&json!({ "content": message }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), StoreError> {
        tracing::info!(target: "admin_actions", "{}", message);
        Ok(())
    }
}
