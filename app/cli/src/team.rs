//! Team composition: turn a [`Config`] into a running dispatcher.
//!
//! Config-declared tools become canned registry entries; each agent is
//! registered as the generalist or a specialist according to its role.

use crate::config::{Config, ToolConfig};
use anyhow::{Context, Result};
use runtime::{Dispatcher, Entry, ToolRegistry};
use sbcore::model::Model;
use std::sync::Arc;

/// Build the shared tool catalog from config.
pub fn catalog(tools: &[ToolConfig]) -> Result<ToolRegistry> {
    let mut catalog = ToolRegistry::new();
    for tool in tools {
        catalog
            .register(canned(tool))
            .with_context(|| format!("invalid tool `{}`", tool.name))?;
    }
    Ok(catalog)
}

/// A tool answering every call with its configured response.
fn canned(tool: &ToolConfig) -> Entry {
    let response: Arc<str> = Arc::from(tool.response.as_str());
    let name = tool.name.clone();
    let description = tool.description.clone();
    match &tool.fields {
        Some(fields) => Entry::fields(name, description, fields.clone(), move |_| {
            let response = response.clone();
            async move { Ok(response.to_string()) }
        }),
        None => Entry::text(name, description, move |_| {
            let response = response.clone();
            async move { Ok(response.to_string()) }
        }),
    }
}

/// Build the dispatcher for the configured team.
pub fn build<M: Model>(config: &Config, model: M) -> Result<Dispatcher<M>> {
    let mut builder = Dispatcher::builder(model)
        .catalog(catalog(&config.tools)?)
        .config(config.dispatch.clone());

    if let Some(generalist) = config.generalist() {
        builder = builder.generalist(generalist.into());
    }
    for specialist in config.specialists() {
        builder = builder.specialist(specialist.into());
    }

    builder.build().context("failed to assemble the agent team")
}
