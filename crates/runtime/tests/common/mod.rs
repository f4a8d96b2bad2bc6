//! Shared fixtures: the general / shopping / banking demo team.

#![allow(dead_code)]

use sbcore::{
    Agent,
    model::{Role, Script},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use switchboard_runtime::{DispatchConfig, Dispatcher, Entry, Field, ToolRegistry};

pub const PRODUCTS: &str = r#"[{"title":"T-shirt","price":20},{"title":"Dress shirt","price":50},{"title":"Long sleeve shirt","price":35}]"#;
pub const BALANCE: &str = "The user has a balance of 2,000 USD and a credit limit of 10,000 USD.";

/// Counts how many times the balance tool body ran.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn catalog(counter: &Counter) -> ToolRegistry {
    let mut catalog = ToolRegistry::new();
    catalog
        .register(Entry::text(
            "product_search",
            "Search the store for products.",
            |_query| async move { Ok(PRODUCTS.to_owned()) },
        ))
        .unwrap();

    let counter = counter.clone();
    catalog
        .register(Entry::fields(
            "card_balance",
            "Look up the user's credit card balance.",
            vec![Field::string("card").describe("Which card to check.")],
            move |_fields| {
                let counter = counter.clone();
                async move {
                    counter.0.fetch_add(1, Ordering::SeqCst);
                    Ok(BALANCE.to_owned())
                }
            },
        ))
        .unwrap();
    catalog
}

pub fn team(script: &Script) -> Dispatcher<Script> {
    team_with(script, &Counter::default(), DispatchConfig::default())
}

pub fn team_with(script: &Script, counter: &Counter, config: DispatchConfig) -> Dispatcher<Script> {
    Dispatcher::builder(script.clone())
        .catalog(catalog(counter))
        .config(config)
        .generalist(Agent::new("general").system_prompt("You route requests."))
        .specialist(
            Agent::new("shopping")
                .description("Online shopping")
                .system_prompt("You help with shopping.")
                .tool("product_search"),
        )
        .specialist(
            Agent::new("banking")
                .description("Online banking")
                .system_prompt("You help with banking.")
                .tool("card_balance"),
        )
        .build()
        .unwrap()
}

pub fn switch(domain: &str, summary: &str) -> String {
    serde_json::json!({ "domain": domain, "summary": summary }).to_string()
}

pub fn escalate(summary: &str) -> String {
    serde_json::json!({ "summary": summary }).to_string()
}

/// Content of the last tool observation in the `n`th request.
pub fn observation(script: &Script, n: usize) -> String {
    script.requests()[n]
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Tool)
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

/// Content of the last user message in the `n`th request.
pub fn last_user(script: &Script, n: usize) -> String {
    script.requests()[n]
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .unwrap_or_default()
}
