//! CLI argument parsing and command dispatch.

use crate::config::{Config, resolve_config};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use compact_str::CompactString;
use model::{Client, OpenAI};
use runtime::Dispatcher;
use std::path::PathBuf;

pub mod agents;
pub mod chat;
pub mod send;

/// Route requests between a generalist and domain specialist agents.
#[derive(Parser, Debug)]
#[command(name = "switchboard", about = "Hierarchical multi-agent chat")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Config file to use instead of the workspace or global one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Default model override.
    #[arg(long, global = true)]
    pub model: Option<CompactString>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive chat session.
    Chat,
    /// Send a one-shot message and print the reply.
    Send {
        /// Message content.
        content: String,
    },
    /// List the agents, their roles and tools.
    Agents,
}

impl Cli {
    /// Resolve config and run the chosen command.
    pub async fn run(self) -> Result<()> {
        let config = self.load()?;
        let dispatcher = connect(&config)?;
        match self.command {
            Command::Chat => chat::run(dispatcher).await,
            Command::Send { content } => send::run(dispatcher, &content).await,
            Command::Agents => {
                agents::print(&dispatcher);
                Ok(())
            }
        }
    }

    /// Load the config and apply flag overrides.
    pub fn load(&self) -> Result<Config> {
        let mut config = resolve_config(self.config.as_deref())?;
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        Ok(config)
    }
}

/// Build the completion provider and the team for a config.
pub fn connect(config: &Config) -> Result<Dispatcher<OpenAI>> {
    let provider = OpenAI::from_config(&config.llm, Client::new())
        .context("failed to configure the completion provider")?;
    crate::team::build(config, provider)
}
