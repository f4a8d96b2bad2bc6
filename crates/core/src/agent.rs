//! Agent configuration.
//!
//! An [`Agent`] is pure config: name, role directive and tool names.
//! Tool handlers and conversation history live in the runtime.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Position of an agent in the delegation hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Entry point of a session. May only delegate downward.
    #[default]
    Generalist,
    /// Domain owner. May only escalate upward.
    Specialist,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Generalist => write!(f, "generalist"),
            Tier::Specialist => write!(f, "specialist"),
        }
    }
}

/// An agent configuration.
///
/// Agents describe *what* an agent does but not *how* tool calls are
/// dispatched. The runtime resolves `tools` against its catalog and adds
/// the control-transfer tool matching the agent's tier.
#[derive(Debug, Clone, Default)]
pub struct Agent {
    /// Agent identifier, also the domain name specialists are routed by.
    pub name: CompactString,
    /// Human-readable description (advertised to the generalist).
    pub description: CompactString,
    /// Role directive sent as the system prompt before each request.
    pub system_prompt: String,
    /// Names of tools this agent can use (resolved by the runtime).
    pub tools: SmallVec<[CompactString; 8]>,
    /// Model override. `None` uses the dispatcher's default model.
    pub model: Option<CompactString>,
}

impl Agent {
    /// Create a new agent with the given name.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<CompactString>) -> Self {
        self.description = desc.into();
        self
    }

    /// Add a tool by name.
    pub fn tool(mut self, name: impl Into<CompactString>) -> Self {
        self.tools.push(name.into());
        self
    }

    /// Pin this agent to a specific model.
    pub fn model(mut self, model: impl Into<CompactString>) -> Self {
        self.model = Some(model.into());
        self
    }
}
