//! OpenAI-compatible completion service.

use crate::{
    config::{ProviderConfig, ProviderKind, endpoint},
    http::HttpProvider,
    request::Request,
};
use anyhow::{Result, bail};
use compact_str::CompactString;
use reqwest::Client;
use sbcore::model::{Model, Response};

/// An OpenAI-compatible provider bound to a default model.
///
/// Covers OpenAI, DeepSeek, Ollama and any other service exposing the
/// chat completions API.
#[derive(Clone)]
pub struct OpenAI {
    http: HttpProvider,
    model: CompactString,
}

impl OpenAI {
    /// Create a provider targeting the OpenAI API.
    pub fn api(client: Client, key: &str, model: impl Into<CompactString>) -> Result<Self> {
        Self::custom(client, key, endpoint::OPENAI, model)
    }

    /// Create a provider targeting the DeepSeek API.
    pub fn deepseek(client: Client, key: &str, model: impl Into<CompactString>) -> Result<Self> {
        Self::custom(client, key, endpoint::DEEPSEEK, model)
    }

    /// Create a provider targeting a local Ollama instance (no API key).
    pub fn ollama(client: Client, model: impl Into<CompactString>) -> Self {
        Self {
            http: HttpProvider::no_auth(client, endpoint::OLLAMA),
            model: model.into(),
        }
    }

    /// Create a provider targeting a custom OpenAI-compatible endpoint.
    pub fn custom(
        client: Client,
        key: &str,
        endpoint: &str,
        model: impl Into<CompactString>,
    ) -> Result<Self> {
        Ok(Self {
            http: HttpProvider::bearer(client, key, endpoint)?,
            model: model.into(),
        })
    }

    /// Build a provider from the `[llm]` config section.
    ///
    /// Ollama and key-less custom endpoints skip authentication; hosted
    /// providers require a key.
    pub fn from_config(config: &ProviderConfig, client: Client) -> Result<Self> {
        let kind = config.kind()?;
        let endpoint = config.endpoint()?;
        let http = match (kind, config.key()) {
            (_, Some(key)) => HttpProvider::bearer(client, key, endpoint)?,
            (ProviderKind::Ollama, None) => HttpProvider::no_auth(client, endpoint),
            (_, None) if config.base_url.is_some() => HttpProvider::no_auth(client, endpoint),
            (kind, None) => bail!("provider {kind:?} requires an api_key"),
        };
        tracing::debug!(?kind, endpoint, model = %config.model, "completion provider ready");
        Ok(Self {
            http,
            model: config.model.clone(),
        })
    }

    /// The chat completions URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        self.http.endpoint()
    }
}

impl Model for OpenAI {
    async fn send(&self, request: &sbcore::model::Request) -> Result<Response> {
        let body = Request::from(request.clone());
        self.http.send(&body).await
    }

    fn active_model(&self) -> CompactString {
        self.model.clone()
    }
}
