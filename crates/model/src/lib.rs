//! OpenAI-compatible completion service for Switchboard.
//!
//! [`OpenAI`] implements [`sbcore::model::Model`] over the chat
//! completions API, for OpenAI, DeepSeek, Ollama or any compatible
//! endpoint selected by [`ProviderConfig`].

pub use config::{ProviderConfig, ProviderKind, endpoint};
pub use http::HttpProvider;
pub use openai::OpenAI;
pub use request::Request;
pub use reqwest::Client;

mod config;
mod http;
mod openai;
mod request;
