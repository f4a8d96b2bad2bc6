//! Runtime agent state: config, resolved tools, and conversation history.

use crate::registry::ToolRegistry;
use compact_str::CompactString;
use sbcore::{
    Tier,
    model::{Message, Request},
};
use serde::{Deserialize, Serialize};

/// One completed exchange in an agent's conversation.
///
/// Only the user-visible halves are kept. Tool traffic stays in the turn
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The utterance (or transfer summary) the agent was handed.
    pub user: String,
    /// The agent's final reply.
    pub reply: String,
}

/// A live agent: its config, tier, tool registry, and history.
#[derive(Debug, Clone)]
pub struct Agent {
    config: sbcore::Agent,
    tier: Tier,
    tools: ToolRegistry,
    history: Vec<Turn>,
}

impl Agent {
    pub(crate) fn new(config: sbcore::Agent, tier: Tier, tools: ToolRegistry) -> Self {
        Self {
            config,
            tier,
            tools,
            history: Vec::new(),
        }
    }

    /// Agent name (the domain name, for specialists).
    pub fn name(&self) -> &CompactString {
        &self.config.name
    }

    /// The agent's tier.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The agent's configuration.
    pub fn config(&self) -> &sbcore::Agent {
        &self.config
    }

    /// Tools this agent may call, transfer tool included.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Committed exchanges, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub(crate) fn commit(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// Messages for a fresh request: role directive, history, then the
    /// new utterance.
    pub(crate) fn context(&self, utterance: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() * 2 + 2);
        if !self.config.system_prompt.is_empty() {
            messages.push(Message::system(&self.config.system_prompt));
        }
        for turn in &self.history {
            messages.push(Message::user(&turn.user));
            messages.push(Message::assistant(&turn.reply, None));
        }
        messages.push(Message::user(utterance));
        messages
    }

    /// Request skeleton for this agent: model and tool catalog.
    pub(crate) fn request(&self, default_model: &CompactString) -> Request {
        let model = self.config.model.as_ref().unwrap_or(default_model);
        Request::new(model.clone()).with_tools(self.tools.descriptors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbcore::model::Role;

    fn agent() -> Agent {
        let config = sbcore::Agent::new("shopping").system_prompt("You help with shopping.");
        Agent::new(config, Tier::Specialist, ToolRegistry::new())
    }

    #[test]
    fn context_orders_directive_history_and_utterance() {
        let mut agent = agent();
        agent.commit(Turn {
            user: "hi".into(),
            reply: "hello".into(),
        });

        let messages = agent.context("find shirts");
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[0].content, "You help with shopping.");
        assert_eq!(messages[3].content, "find shirts");
    }

    #[test]
    fn empty_directive_is_skipped() {
        let agent = Agent::new(
            sbcore::Agent::new("general"),
            Tier::Generalist,
            ToolRegistry::new(),
        );
        assert_eq!(agent.context("hi").len(), 1);
    }

    #[test]
    fn model_override_wins() {
        let default = CompactString::new("gpt-4");
        assert_eq!(agent().request(&default).model, "gpt-4");

        let pinned = Agent::new(
            sbcore::Agent::new("banking").model("gpt-4o"),
            Tier::Specialist,
            ToolRegistry::new(),
        );
        assert_eq!(pinned.request(&default).model, "gpt-4o");
    }
}
