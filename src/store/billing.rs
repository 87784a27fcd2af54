use async_trait::async_trait;
use serde::Deserialize;

use crate::deletion::BillingCancellation;
use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct CancelResponse {
    #[serde(default)]
    canceled: bool,
}

/// Client for the billing subsystem's cancellation endpoint.
#[derive(Clone)]
pub struct HttpBillingClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBillingClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BillingCancellation for HttpBillingClient {
    async fn cancel_and_confirm(&self, account_id: i64) -> Result<bool, StoreError> {
        let url = format!("{}/subscriptions/{}/cancel", self.base_url, account_id);
        let response: CancelResponse = self
            .http
            .post(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(account_id, canceled = response.canceled, "billing cancellation");
        Ok(response.canceled)
    }
}
