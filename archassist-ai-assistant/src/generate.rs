//! Text generation providers.
//!
//! A generator turns a question, a retrieved context and a system
//! instruction into free-form text. The mock generator is deterministic and
//! offline; the live generator calls an OpenAI-compatible chat endpoint.

use crate::config::{GenerationConfig, LlmMode};
use crate::error::GenerateError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Characters of context echoed back by [`MockGenerator`].
pub const MOCK_CONTEXT_CHARS: usize = 600;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate an answer to `query`.
    ///
    /// An empty `context` or `system_prompt` is simply omitted.
    async fn generate(
        &self,
        query: &str,
        context: &str,
        system_prompt: &str,
    ) -> Result<String, GenerateError>;

    fn generator_name(&self) -> &str;
}

/// Echoes the question and the first 600 characters of the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn render(query: &str, context: &str) -> String {
        let context: String = context.chars().take(MOCK_CONTEXT_CHARS).collect();
        format!("[MOCK LLM RESPONSE]\n\nQuestion:\n{query}\n\nContext:\n{context}")
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        query: &str,
        context: &str,
        _system_prompt: &str,
    ) -> Result<String, GenerateError> {
        Ok(Self::render(query, context))
    }

    fn generator_name(&self) -> &str {
        "mock"
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Chat completions against an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiChatGenerator {
    config: GenerationConfig,
    client: Client,
}

impl std::fmt::Debug for OpenAiChatGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatGenerator")
            .field("model", &self.config.model)
            .field("endpoint", &self.config.chat_url())
            .finish()
    }
}

impl OpenAiChatGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerateError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, client })
    }

    fn messages(query: &str, context: &str, system_prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(3);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: system_prompt.to_string(),
            });
        }
        if !context.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: format!("Context:\n{context}"),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: query.to_string(),
        });
        messages
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatGenerator {
    async fn generate(
        &self,
        query: &str,
        context: &str,
        system_prompt: &str,
    ) -> Result<String, GenerateError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| GenerateError::InvalidConfig("No API key configured".to_string()))?;
        let url = self.config.chat_url();
        debug!("Requesting completion from {} with model {}", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&ChatRequest {
                model: &self.config.model,
                messages: Self::messages(query, context, system_prompt),
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Generation service returned {}: {}", status, message);
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerateError::MalformedResponse("response contained no choices".to_string()))
    }

    fn generator_name(&self) -> &str {
        "openai"
    }
}

/// Build the generator selected by `config.mode`.
pub fn generator_from_config(config: &GenerationConfig) -> Result<Arc<dyn TextGenerator>, GenerateError> {
    config.validate()?;
    info!("Using {} text generation", config.mode);
    match config.mode {
        LlmMode::Mock => Ok(Arc::new(MockGenerator)),
        LlmMode::Live => Ok(Arc::new(OpenAiChatGenerator::new(config.clone())?)),
    }
}
