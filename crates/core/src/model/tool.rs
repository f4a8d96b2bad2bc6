//! Tool descriptors and tool calls

use compact_str::CompactString;
use schemars::Schema;
use serde::{Deserialize, Serialize};

/// A tool advertised to the model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tool {
    /// The name of the tool
    pub name: CompactString,

    /// The description of the tool
    pub description: String,

    /// The parameters of the tool
    pub parameters: Schema,

    /// Whether to strictly validate the parameters
    pub strict: bool,
}

/// A tool call made by the model
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ToolCall {
    /// The ID of the tool call
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub id: CompactString,

    /// The type of tool (currently only "function")
    #[serde(default, rename = "type")]
    pub call_type: CompactString,

    /// The function to call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function call with the given id, name and JSON arguments.
    pub fn new(
        id: impl Into<CompactString>,
        name: impl Into<CompactString>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// A function call within a tool call
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FunctionCall {
    /// The name of the function to call
    #[serde(default)]
    pub name: CompactString,

    /// The arguments to pass to the function (JSON string)
    #[serde(default)]
    pub arguments: String,
}

/// Controls which tool is called by the model
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub enum ToolChoice {
    /// Model will not call any tool
    #[serde(rename = "none")]
    None,

    /// Model can pick between generating a message or calling tools
    #[serde(rename = "auto")]
    #[default]
    Auto,

    /// Model must call one or more tools
    #[serde(rename = "required")]
    Required,

    /// Model must call the specified function
    Function(CompactString),
}

impl From<&str> for ToolChoice {
    fn from(value: &str) -> Self {
        ToolChoice::Function(value.into())
    }
}
