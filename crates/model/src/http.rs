//! Shared HTTP transport for OpenAI-compatible providers.
//!
//! `HttpProvider` wraps a `reqwest::Client` with pre-configured headers and
//! the endpoint URL, and posts JSON bodies to it.

use anyhow::{Context, Result, bail};
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderValue},
};
use sbcore::model::Response;
use serde::Serialize;

/// Shared HTTP transport for OpenAI-compatible providers.
///
/// Holds a `reqwest::Client`, pre-built headers (auth + content-type),
/// and the target endpoint URL.
#[derive(Clone)]
pub struct HttpProvider {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl HttpProvider {
    /// Create a provider with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        let mut headers = json_headers();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {key}")
                .parse()
                .context("API key is not a valid header value")?,
        );
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Create a provider without authentication (e.g. Ollama).
    pub fn no_auth(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            headers: json_headers(),
            endpoint: endpoint.to_owned(),
        }
    }

    /// Send a request and deserialize the response as JSON.
    ///
    /// Non-success statuses become errors carrying the response body.
    pub async fn send(&self, body: &impl Serialize) -> Result<Response> {
        tracing::trace!("request: {}", serde_json::to_string(body)?);
        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.endpoint))?;

        let status = response.status();
        let text = response.text().await?;
        tracing::trace!("response: {text}");
        if !status.is_success() {
            bail!("{status}: {text}");
        }

        serde_json::from_str(&text).context("unexpected completion response")
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}
