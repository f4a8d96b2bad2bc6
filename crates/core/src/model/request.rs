//! Chat request type.

use crate::model::{Message, Tool, ToolChoice};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A chat completion request.
///
/// Contains everything needed to make a model call: model, messages and
/// tools. Provider implementations convert this to their wire format via
/// `From<Request>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Request {
    /// The model to use.
    pub model: CompactString,

    /// The conversation messages, system directive first.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// The tools available for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,

    /// Controls which tool is called by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,

    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Request {
    /// Create a new request for the given model.
    pub fn new(model: impl Into<CompactString>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            tools: None,
            tool_choice: None,
            temperature: None,
        }
    }

    /// Set the messages for this request.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Set the tools for this request. An empty catalog clears the tools.
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Set the tool choice for this request.
    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The system directive, if the first message carries one.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == crate::model::Role::System)
            .map(|m| m.content.as_str())
    }
}
