// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible generation service for the Uma assistant.
//!
//! Implements [`GenerationService`] on top of the chat completions endpoint.
//! Any server speaking the same protocol (local inference servers, proxies)
//! works by pointing `generation.base_url` at it.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::{debug, info};
use uma_config::model::GenerationConfig;
use uma_core::{
    AdapterType, GenerationParams, GenerationService, HealthStatus, PluginAdapter, UmaError,
};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

/// Generation service backed by chat completions.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiGenerator {
    client: OpenAiClient,
}

impl OpenAiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, UmaError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = OpenAiClient::new(&api_key, &config.base_url, config.timeout())?;
        info!(
            model = config.model,
            endpoint = client.endpoint(),
            "generation service initialized"
        );
        Ok(Self { client })
    }

    pub fn with_client(client: OpenAiClient) -> Self {
        Self { client }
    }

    fn to_request(prompt: &str, params: &GenerationParams) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !params.system_prompt.trim().is_empty() {
            messages.push(ChatMessage::system(params.system_prompt.clone()));
        }
        messages.push(ChatMessage::user(prompt));
        ChatRequest {
            model: params.model.clone(),
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, UmaError> {
        // No probe request: it would spend tokens.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationService for OpenAiGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, UmaError> {
        let request = Self::to_request(prompt, params);
        let response = self.client.complete(&request).await?;

        if let Some(usage) = response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(UmaError::generation("generation service returned an empty answer"));
        }
        Ok(text)
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, UmaError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("OPENAI_API_KEY").map_err(|_| {
        UmaError::Config(
            "API key not found. Set generation.api_key in config, UMA_GENERATION_API_KEY or OPENAI_API_KEY.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            model: "gpt-4o-mini".into(),
            max_tokens: 128,
            temperature: 0.3,
            system_prompt: "You are Uma.".into(),
        }
    }

    fn generator(server: &MockServer) -> OpenAiGenerator {
        let config = GenerationConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".into()),
            timeout_ms: 2_000,
            ..GenerationConfig::default()
        };
        OpenAiGenerator::new(&config).unwrap()
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key(&Some("sk-1".into())).unwrap(), "sk-1");
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        let result = resolve_api_key(&None);
        // Succeeds only when OPENAI_API_KEY is set in the environment.
        if let Err(e) = result {
            assert!(e.to_string().contains("API key not found"), "got: {e}");
        }
    }

    #[test]
    fn request_puts_system_prompt_first() {
        let request = OpenAiGenerator::to_request("context and question", &params());
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0], ChatMessage::system("You are Uma."));
        assert_eq!(request.messages[1], ChatMessage::user("context and question"));

        let mut bare = params();
        bare.system_prompt = "  ".into();
        assert_eq!(OpenAiGenerator::to_request("q", &bare).messages.len(), 1);
    }

    #[tokio::test]
    async fn generate_returns_trimmed_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini", "max_tokens": 128})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  Race starts at 9.\n"}}]
            })))
            .mount(&server)
            .await;

        let answer = generator(&server).generate("When?", &params()).await.unwrap();
        assert_eq!(answer, "Race starts at 9.");
    }

    #[tokio::test]
    async fn empty_answer_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let err = generator(&server).generate("When?", &params()).await.unwrap_err();
        assert!(matches!(err, UmaError::Generation { .. }));
    }

    #[tokio::test]
    async fn health_check_is_healthy() {
        let client = OpenAiClient::new("sk", "http://localhost:1", Duration::from_secs(1)).unwrap();
        let generator = OpenAiGenerator::with_client(client);
        assert_eq!(generator.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(generator.adapter_type(), AdapterType::Generation);
    }
}
