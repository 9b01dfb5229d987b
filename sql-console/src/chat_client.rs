//! Chat-completion HTTP client.

use common::config::LlmConfig;
use common::errors::{AppError, AppResult};
use common::models::chat::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// One POST per call: no retry and no timeout beyond the HTTP client's own.
pub struct ChatClient {
    http_client: reqwest::Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(http_client: reqwest::Client, config: LlmConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Sends the conversation and returns `choices[0].message.content`.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
        };
        let url = self.config.completions_url();
        tracing::debug!(url = %url, model = %request.model, "sending chat completion");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("chat completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "chat completion endpoint returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::InvalidResponse(format!("chat completion body: {}", e)))?;

        body.first_content()
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                AppError::InvalidResponse("missing choices[0].message.content".to_string())
            })
    }
}
