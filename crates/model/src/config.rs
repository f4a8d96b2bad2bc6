//! Provider configuration.

use anyhow::{Result, bail};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion endpoints.
pub mod endpoint {
    /// OpenAI chat completions.
    pub const OPENAI: &str = "https://api.openai.com/v1/chat/completions";
    /// DeepSeek chat completions.
    pub const DEEPSEEK: &str = "https://api.deepseek.com/chat/completions";
    /// Ollama local chat completions.
    pub const OLLAMA: &str = "http://localhost:11434/v1/chat/completions";
}

/// Supported provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI API.
    #[serde(rename = "openai")]
    OpenAI,
    /// DeepSeek API.
    #[serde(rename = "deepseek")]
    DeepSeek,
    /// Ollama local API, no key required.
    Ollama,
}

/// Completion provider settings (the `[llm]` config section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider kind. Detected from the model name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    /// Default model for agents without an override.
    pub model: CompactString,
    /// API key (supports `${ENV_VAR}` expansion in config files).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Chat completions URL override for OpenAI-compatible services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: Some(ProviderKind::OpenAI),
            model: "gpt-4".into(),
            api_key: Some("${OPENAI_API_KEY}".into()),
            base_url: None,
        }
    }
}

impl ProviderConfig {
    /// The provider kind, explicit or detected from the model name.
    ///
    /// A custom `base_url` with an unrecognized model is treated as a
    /// generic OpenAI-compatible service.
    pub fn kind(&self) -> Result<ProviderKind> {
        if let Some(kind) = self.provider {
            return Ok(kind);
        }

        let model = self.model.as_str();
        if model.starts_with("deepseek") {
            Ok(ProviderKind::DeepSeek)
        } else if model.starts_with("gpt-")
            || model.starts_with("o1")
            || model.starts_with("o3")
            || model.starts_with("o4")
            || self.base_url.is_some()
        {
            Ok(ProviderKind::OpenAI)
        } else {
            bail!("cannot detect the provider for model `{model}`, set `provider` explicitly")
        }
    }

    /// The chat completions URL to post to.
    pub fn endpoint(&self) -> Result<&str> {
        if let Some(url) = self.base_url.as_deref() {
            return Ok(url);
        }
        Ok(match self.kind()? {
            ProviderKind::OpenAI => endpoint::OPENAI,
            ProviderKind::DeepSeek => endpoint::DEEPSEEK,
            ProviderKind::Ollama => endpoint::OLLAMA,
        })
    }

    /// The API key, if one is set and non-empty.
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
