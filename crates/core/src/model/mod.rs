//! Model-facing types and the completion service trait.
//!
//! Provides the shared types used between the runtime and any completion
//! backend: `Message`, `Tool`, `Request`, `Response`, and the [`Model`]
//! trait. Wire shapes follow the OpenAI chat-completions format so HTTP
//! providers can serialize them directly.

use anyhow::Result;
use compact_str::CompactString;
pub use message::{Message, Role};
pub use request::Request;
pub use response::{Action, Choice, CompletionMeta, Delta, FinishReason, Response, Usage};
#[cfg(feature = "testing")]
pub use testing::{Script, Step};
pub use tool::{FunctionCall, Tool, ToolCall, ToolChoice};

mod message;
mod request;
mod response;
#[cfg(feature = "testing")]
mod testing;
mod tool;

/// A model-completion service.
///
/// Given a request carrying the role directive, ordered history and tool
/// catalog, returns either a final reply or tool-invocation requests (see
/// [`Response::action`]). Constructors are inherent methods on each
/// implementation; never called polymorphically.
pub trait Model: Clone + Send + Sync {
    /// Send a chat completion request.
    fn send(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send;

    /// Get the active/default model name.
    fn active_model(&self) -> CompactString;
}
