//! Core abstractions for the Switchboard dispatcher.
//!
//! - [`Agent`]: pure config (name, role directive, tool names).
//! - [`model`]: the model-facing message, tool and response types plus the
//!   [`Model`](model::Model) trait consumed by the runtime.
//! - [`Error`]: the dispatcher error taxonomy.

pub use {
    agent::{Agent, Tier},
    error::{Error, Result},
};

mod agent;
mod error;
pub mod model;
