//! Configuration loading and resolution for the CLI.
//!
//! Resolves config.toml in priority order:
//! 1. `--config <path>` flag (explicit override)
//! 2. `{cwd}/.switchboard/config.toml` (workspace config)
//! 3. `~/.config/switchboard/config.toml` (global default)
//!
//! If the global default doesn't exist, it is generated automatically with
//! the general / shopping / banking demo team.

use crate::utils::expand_env_vars;
use anyhow::{Context, Result, bail};
use compact_str::CompactString;
use model::ProviderConfig;
use runtime::{DispatchConfig, Field};
use sbcore::Tier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Workspace config path, relative to the working directory.
pub const WORKSPACE_CONFIG: &str = ".switchboard/config.toml";

/// Default config template generated when no config exists.
pub const DEFAULT_CONFIG: &str = r#"[llm]
provider = "openai"
model = "gpt-4"
api_key = "${OPENAI_API_KEY}"

[dispatch]
max_iterations = 10
completion_timeout_secs = 60
tool_timeout_secs = 30
temperature = 0.0

[[tools]]
name = "product_search"
description = "Call this tool to search for products by keyword or description. It returns a JSON list of product descriptions and prices in USD. Output the results as a numbered list so the user can refer to them easily."
response = '[{"description":"T-shirt","price":20},{"description":"Dress shirt","price":50},{"description":"Long sleeve shirt","price":35}]'

[[tools]]
name = "card_balance"
description = "Call this tool to retrieve the balance and credit limit for the user's primary credit card. This tool does not require any input."
fields = []
response = "The user has a balance of 2,000 USD and a credit limit of 10,000 USD."

[[agents]]
name = "general"
role = "generalist"
description = "General assistant"
system_prompt = "You are a helpful assistant. When a request belongs to one of the available domains, switch to it and pass along a summary of the relevant context."

[[agents]]
name = "shopping"
description = "Call this domain if the user wants to do some online shopping."
system_prompt = "You help the user shop online. Escalate anything outside of shopping."
tools = ["product_search"]

[[agents]]
name = "banking"
description = "Call this domain if the user wants to do some online banking."
system_prompt = "You help the user with online banking. Escalate anything outside of banking."
tools = ["card_balance"]
"#;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider.
    pub llm: ProviderConfig,
    /// Dispatcher limits.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Canned tools agents may use.
    #[serde(default)]
    pub tools: Vec<ToolConfig>,
    /// The team: exactly one generalist plus specialists.
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

/// A tool answering every call with a fixed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Tool name.
    pub name: CompactString,
    /// Description the model decides by.
    pub description: String,
    /// Structured input fields. Omit for a free-form text tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    /// Text returned on every call.
    pub response: String,
}

/// One agent of the team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent name, also the domain name for specialists.
    pub name: CompactString,
    /// Position in the hierarchy.
    #[serde(default = "default_role")]
    pub role: Tier,
    /// Description advertised to the generalist.
    #[serde(default)]
    pub description: CompactString,
    /// Role directive.
    #[serde(default)]
    pub system_prompt: String,
    /// Tool names, in advertised order.
    #[serde(default)]
    pub tools: Vec<CompactString>,
    /// Model override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<CompactString>,
}

fn default_role() -> Tier {
    Tier::Specialist
}

impl From<&AgentConfig> for sbcore::Agent {
    fn from(config: &AgentConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            system_prompt: config.system_prompt.clone(),
            tools: config.tools.iter().cloned().collect(),
            model: config.model.clone(),
        }
    }
}

impl Config {
    /// Parse a TOML string, expanding `${VAR}` references first.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// The generalist's config.
    pub fn generalist(&self) -> Option<&AgentConfig> {
        self.agents.iter().find(|a| a.role == Tier::Generalist)
    }

    /// Specialist configs, in declaration order.
    pub fn specialists(&self) -> impl Iterator<Item = &AgentConfig> {
        self.agents.iter().filter(|a| a.role == Tier::Specialist)
    }

    fn validate(&self) -> Result<()> {
        let generalists = self
            .agents
            .iter()
            .filter(|a| a.role == Tier::Generalist)
            .count();
        if generalists != 1 {
            bail!("expected exactly one generalist agent, found {generalists}");
        }
        if self.dispatch.max_iterations == 0 {
            bail!("dispatch.max_iterations must be at least 1");
        }
        Ok(())
    }
}

/// Resolve the config following the priority chain.
pub fn resolve_config(config_flag: Option<&Path>) -> Result<Config> {
    resolve_in(config_flag, Path::new(WORKSPACE_CONFIG), &global_config_path())
}

/// Resolve against explicit workspace and global paths.
pub fn resolve_in(config_flag: Option<&Path>, workspace: &Path, global: &Path) -> Result<Config> {
    if let Some(path) = config_flag {
        return Config::load(path);
    }

    if workspace.exists() {
        return Config::load(workspace);
    }

    if !global.exists() {
        generate_default_config(global)?;
        tracing::info!("generated default config at {}", global.display());
    }
    Config::load(global)
}

/// Path to the global default config.
pub fn global_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("switchboard")
        .join("config.toml")
}

/// Write the default config at the given path.
fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(())
}
