//! Chat messages

use crate::model::ToolCall;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A message in the chat
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Message {
    /// The role of the message
    pub role: Role,

    /// The content of the message
    #[serde(default)]
    pub content: String,

    /// The tool call id
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub tool_call_id: CompactString,

    /// The tool calls
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub tool_calls: SmallVec<[ToolCall; 4]>,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>, tool_calls: Option<&[ToolCall]>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: tool_calls
                .map(|tc| tc.iter().cloned().collect())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Create a new tool message
    pub fn tool(content: impl Into<String>, call: impl Into<CompactString>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: call.into(),
            ..Default::default()
        }
    }
}

/// The role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub enum Role {
    /// The user role
    #[serde(rename = "user")]
    #[default]
    User,
    /// The assistant role
    #[serde(rename = "assistant")]
    Assistant,
    /// The system role
    #[serde(rename = "system")]
    System,
    /// The tool role
    #[serde(rename = "tool")]
    Tool,
}
