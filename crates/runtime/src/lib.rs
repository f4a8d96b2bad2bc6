//! Switchboard runtime: hierarchical delegation among agents.
//!
//! The [`Dispatcher`] owns a generalist and any number of domain
//! specialists, each with its own [`ToolRegistry`] and private history.
//! The generalist can hand a request down with `switch_domain`; a
//! specialist can hand it back up with `escalate`. Control never moves
//! sideways, so a request cannot bounce between two specialists.
//!
//! # Example
//!
//! ```rust,ignore
//! use runtime::{Dispatcher, Entry, ToolRegistry};
//! use sbcore::Agent;
//!
//! let mut catalog = ToolRegistry::new();
//! catalog.register(Entry::text("search", "Search products", |q| async move {
//!     Ok(format!("results for {q}"))
//! }))?;
//!
//! let mut dispatcher = Dispatcher::builder(model)
//!     .catalog(catalog)
//!     .generalist(Agent::new("general"))
//!     .specialist(Agent::new("shopping").description("Online shopping").tool("search"))
//!     .build()?;
//! let reply = dispatcher.handle("find me a shirt").await;
//! ```

pub use {
    agent::{Agent, Turn},
    dispatcher::{APOLOGY, Builder, DEGRADED_REPLY, DispatchConfig, Dispatcher},
    registry::{Entry, Field, Handler, Input, Invocation, Kind, ToolRegistry},
    transfer::{ESCALATE, MAX_TRANSFER_DEPTH, SWITCH_DOMAIN},
};

mod agent;
mod dispatcher;
pub mod registry;
pub mod session;
pub mod transfer;
