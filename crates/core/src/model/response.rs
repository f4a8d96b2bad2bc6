//! Chat response types and their interpretation as agent actions

use crate::model::{Message, Role, ToolCall};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Completion metadata
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CompletionMeta {
    /// A unique identifier for the chat completion
    pub id: String,

    /// The object type
    pub object: String,

    /// Unix timestamp (in seconds) of when the response was created
    pub created: u64,

    /// The model used for the completion
    pub model: String,
}

/// Message content in a completion response
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Delta {
    /// The role of the message author
    #[serde(default)]
    pub role: Option<Role>,

    /// The content of the message
    #[serde(default)]
    pub content: Option<String>,

    /// Tool calls made by the model
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// A chat completion response from the model
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Response {
    /// Completion metadata
    #[serde(flatten)]
    pub meta: CompletionMeta,

    /// The list of completion choices
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token usage statistics
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// What the model asked the agent to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A final reply for the user.
    Reply(String),
    /// One or more tool invocations, processed in order.
    Invoke(SmallVec<[ToolCall; 4]>),
    /// Output that is neither a reply nor a usable tool call.
    Malformed(String),
}

impl Response {
    /// A response carrying a final text reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_delta(
            Delta {
                role: Some(Role::Assistant),
                content: Some(content.into()),
                tool_calls: None,
            },
            FinishReason::Stop,
        )
    }

    /// A response requesting the given tool calls.
    pub fn calls(calls: Vec<ToolCall>) -> Self {
        Self::with_delta(
            Delta {
                role: Some(Role::Assistant),
                content: None,
                tool_calls: Some(calls),
            },
            FinishReason::ToolCalls,
        )
    }

    fn with_delta(message: Delta, reason: FinishReason) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some(reason),
            }],
            ..Default::default()
        }
    }

    /// The assistant message of the first choice.
    pub fn message(&self) -> Option<Message> {
        let choice = self.choices.first()?;
        Some(Message::assistant(
            choice.message.content.clone().unwrap_or_default(),
            choice.message.tool_calls.as_deref(),
        ))
    }

    /// Get the content of the first choice
    pub fn content(&self) -> Option<&String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
    }

    /// Get the tool calls of the first choice
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        self.choices
            .first()
            .and_then(|choice| choice.message.tool_calls.as_deref())
    }

    /// Get the reason the model stopped generating
    pub fn reason(&self) -> Option<&FinishReason> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_ref())
    }

    /// Interpret the first choice as an agent action.
    ///
    /// Tool calls win over content. A call without a function name, an
    /// empty reply, or a response without choices is malformed.
    pub fn action(&self) -> Action {
        if self.choices.is_empty() {
            return Action::Malformed("response has no choices".into());
        }

        if let Some(calls) = self.tool_calls().filter(|calls| !calls.is_empty()) {
            if calls.iter().any(|c| c.function.name.is_empty()) {
                return Action::Malformed("tool call without a function name".into());
            }
            return Action::Invoke(calls.iter().cloned().collect());
        }

        match self.content() {
            Some(text) if !text.trim().is_empty() => Action::Reply(text.clone()),
            _ => match self.reason() {
                Some(FinishReason::Length) => Action::Malformed("output was truncated".into()),
                Some(FinishReason::ContentFilter) => {
                    Action::Malformed("output was filtered".into())
                }
                _ => Action::Malformed("empty completion".into()),
            },
        }
    }
}

/// A completion choice
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Choice {
    /// The index of this choice in the list
    #[serde(default)]
    pub index: u32,

    /// The generated message
    pub message: Delta,

    /// The reason the model stopped generating
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// The reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished naturally
    Stop,

    /// The model hit the max token limit
    Length,

    /// Content was filtered
    ContentFilter,

    /// The model is making tool calls
    ToolCalls,

    /// Insufficient system resources
    InsufficientSystemResource,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Number of tokens in the completion
    pub completion_tokens: u32,

    /// Total number of tokens used
    pub total_tokens: u32,
}
