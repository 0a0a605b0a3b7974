//! Assistant configuration: a `[retriever]` section shared with
//! `archassist-ai-retriever` and a `[generation]` section for the text
//! generator.
//!
//! ```toml
//! [retriever]
//! data_dir = "data"
//!
//! [generation]
//! mode = "live"
//! model = "gpt-4o-mini"
//! temperature = 0.7
//! ```

use crate::error::{AssistantError, GenerateError};
use archassist_ai_embed::config::ENV_API_KEY;
use archassist_ai_retriever::config::RetrieverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable selecting the generation mode.
pub const ENV_LLM_MODE: &str = "LLM_MODE";

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// How answers are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    /// Echo the question and a truncated context, no network
    #[default]
    Mock,
    /// Remote OpenAI-compatible chat completions API
    Live,
}

impl FromStr for LlmMode {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(LlmMode::Mock),
            "live" | "openai" | "remote" => Ok(LlmMode::Live),
            other => Err(GenerateError::InvalidConfig(format!(
                "Unknown LLM mode '{other}' (expected 'mock' or 'live')"
            ))),
        }
    }
}

impl std::fmt::Display for LlmMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmMode::Mock => write!(f, "mock"),
            LlmMode::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub mode: LlmMode,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    pub api_base: String,
    /// Never serialized
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: LlmMode::Mock,
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_base: archassist_ai_embed::config::DEFAULT_API_BASE.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
        }
    }
}

impl GenerationConfig {
    pub fn live(api_key: impl Into<String>) -> Self {
        Self {
            mode: LlmMode::Live,
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// Overlay `LLM_MODE` and `OPENAI_API_KEY`. Empty values are ignored.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, GenerateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_LLM_MODE).filter(|v| !v.trim().is_empty()) {
            self.mode = mode.parse()?;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.mode == LlmMode::Live {
            if self.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
                return Err(GenerateError::InvalidConfig(format!(
                    "Live LLM mode requires an API key (set {ENV_API_KEY})"
                )));
            }
            if self.model.trim().is_empty() {
                return Err(GenerateError::InvalidConfig(
                    "Model name must not be empty".to_string(),
                ));
            }
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GenerateError::InvalidConfig(format!(
                "Temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub retriever: RetrieverConfig,
    pub generation: GenerationConfig,
}

impl AssistantConfig {
    pub fn from_toml_str(path: &Path, contents: &str) -> Result<Self, AssistantError> {
        toml::from_str(contents).map_err(|source| AssistantError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults or `path`, overlaid with the process environment, validated.
    pub fn load(path: Option<&Path>) -> Result<Self, AssistantError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, AssistantError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match path {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| AssistantError::ReadConfig {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Self::from_toml_str(path, &contents)?
            }
            None => Self::default(),
        };

        let config = Self {
            retriever: config.retriever.apply_env_with(&lookup)?,
            generation: config.generation.apply_env_with(&lookup)?,
        };
        config.retriever.validate()?;
        config.generation.validate()?;
        Ok(config)
    }
}
