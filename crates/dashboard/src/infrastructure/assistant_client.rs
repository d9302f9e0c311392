//! Assistant webhook client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::http_client::map_transport_error;
use crate::ports::outbound::{ApiError, AssistantPort};

/// Sends operator prompts to the automation webhook as `GET ?prompt=...`
#[derive(Clone)]
pub struct WebhookAssistant {
    client: Client,
    webhook_url: Url,
}

impl WebhookAssistant {
    pub fn new(webhook_url: Url, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });
        Self {
            client,
            webhook_url,
        }
    }
}

#[async_trait]
impl AssistantPort for WebhookAssistant {
    async fn ask(&self, prompt: &str) -> Result<String, ApiError> {
        tracing::debug!(prompt_len = prompt.len(), "Sending prompt to assistant webhook");

        let response = self
            .client
            .get(self.webhook_url.clone())
            .query(&[("prompt", prompt)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Assistant webhook returned an error");
            return Err(ApiError::http(status.as_u16(), body));
        }
        Ok(body)
    }
}
