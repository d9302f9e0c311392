//! Assistant Service - questions to the automation webhook

use std::sync::Arc;

use prometeo_domain::DomainError;
use prometeo_shared::{AssistantReply, ASSISTANT_ERROR_MESSAGE};

use crate::application::ServiceError;
use crate::ports::outbound::AssistantPort;

#[derive(Clone)]
pub struct AssistantService {
    port: Option<Arc<dyn AssistantPort>>,
}

impl AssistantService {
    pub fn new(port: Option<Arc<dyn AssistantPort>>) -> Self {
        Self { port }
    }

    pub fn is_available(&self) -> bool {
        self.port.is_some()
    }

    /// Send `prompt` and classify the reply
    pub async fn ask(&self, prompt: &str) -> Result<AssistantReply, ServiceError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(DomainError::validation("prompt must not be empty").into());
        }
        let port = self.port.as_ref().ok_or(ServiceError::AssistantUnavailable)?;

        let body = port.ask(prompt).await?;
        let reply = AssistantReply::from_body(&body);
        if reply.text().is_none() {
            tracing::warn!(body_len = body.len(), "Assistant reply had no usable text");
        }
        Ok(reply)
    }

    /// Text to show in the chat log, whatever happened
    pub async fn answer(&self, prompt: &str) -> String {
        match self.ask(prompt).await {
            Ok(reply) => reply.display_text().to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Assistant request failed");
                ASSISTANT_ERROR_MESSAGE.to_string()
            }
        }
    }
}
