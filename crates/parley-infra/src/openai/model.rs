//! OpenAiModel -- concrete [`ModelProvider`] implementation for the OpenAI
//! chat-completions API.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when constructing HTTP request headers; it never appears in Debug or
//! Display output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use parley_core::model::ModelProvider;
use parley_types::error::ModelError;
use parley_types::model::{Completion, ModelRequest};

use super::types::ChatCompletionResponse;

/// OpenAI chat-completions model provider.
pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiModel {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.openai.com".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl ModelProvider for OpenAiModel {
    async fn complete(&self, request: &ModelRequest) -> Result<Completion, ModelError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| ModelError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status: status.as_u16(), body });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Deserialization(e.to_string()))?;

        let best = completion
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyCompletion)?;

        Ok(Completion { content: best.message.content })
    }
}
