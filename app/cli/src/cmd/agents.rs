//! Agent listing command.

use runtime::Dispatcher;
use sbcore::model::Model;
use std::fmt::Write;

/// Render each agent with its role and tools in advertised order.
pub fn render<M: Model>(dispatcher: &Dispatcher<M>) -> String {
    let mut out = String::new();
    for agent in dispatcher.agents() {
        let description = agent.config().description.as_str();
        let description = if description.is_empty() {
            "(no description)"
        } else {
            description
        };
        let _ = writeln!(out, "{} ({}): {}", agent.name(), agent.tier(), description);
        for tool in agent.tools().names() {
            let _ = writeln!(out, "  - {tool}");
        }
    }
    out
}

/// Print the agent listing.
pub fn print<M: Model>(dispatcher: &Dispatcher<M>) {
    print!("{}", render(dispatcher));
}
