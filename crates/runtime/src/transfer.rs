//! Control-transfer pseudo-tools.
//!
//! The generalist gets [`SWITCH_DOMAIN`] to hand a request to a
//! specialist; every specialist gets [`ESCALATE`] to hand one back. Both
//! carry a summary, which becomes the utterance the receiving agent acts
//! on.

use crate::registry::{Entry, Field, Input, Invocation};
use compact_str::CompactString;
use sbcore::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Name of the generalist's delegation tool.
pub const SWITCH_DOMAIN: &str = "switch_domain";

/// Name of the specialists' escalation tool.
pub const ESCALATE: &str = "escalate";

/// Maximum number of transfers within one turn.
///
/// Asymmetric transfer rights cap a legitimate chain at
/// specialist → generalist → specialist.
pub const MAX_TRANSFER_DEPTH: usize = 2;

/// A domain advertised to the generalist.
#[derive(Debug, Clone)]
pub struct Domain {
    pub name: CompactString,
    pub description: CompactString,
}

/// Build the generalist's `switch_domain` tool for the given domains.
pub fn switch_tool(domains: &[Domain]) -> Entry {
    let names = domains
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let listing = domains
        .iter()
        .map(|d| {
            if d.description.is_empty() {
                format!("- {}", d.name)
            } else {
                format!("- {}: {}", d.name, d.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let description = format!(
        "Transfer the conversation to a specialist when the request belongs to its domain. \
         Pass the domain and a summary of the relevant context.\nDomains:\n{listing}"
    );
    let fields = vec![
        Field::string("domain").describe(format!("The target domain, one of: {names}.")),
        Field::string("summary")
            .describe("A summary of the relevant context for the specialist to act on."),
    ];
    Entry::new(
        SWITCH_DOMAIN,
        description,
        Input::Fields(fields),
        Invocation::Switch,
    )
}

/// Build the specialists' `escalate` tool.
pub fn escalate_tool() -> Entry {
    let fields = vec![
        Field::string("summary").describe("A summary of the relevant context to hand back."),
    ];
    Entry::new(
        ESCALATE,
        "Call this tool if the user needs something outside of your domain. \
         Pass in a summary of the relevant context.",
        Input::Fields(fields),
        Invocation::Escalate,
    )
}

/// Validated `switch_domain` arguments.
#[derive(Debug, Deserialize)]
pub struct Switch {
    pub domain: CompactString,
    pub summary: String,
}

/// Validated `escalate` arguments.
#[derive(Debug, Deserialize)]
pub struct Escalate {
    pub summary: String,
}

impl Switch {
    /// Decode arguments already validated against the tool's fields.
    pub fn from_input(input: Value) -> Result<Self> {
        let switch: Self = decode(SWITCH_DOMAIN, input)?;
        require_summary(SWITCH_DOMAIN, &switch.summary)?;
        Ok(switch)
    }
}

impl Escalate {
    /// Decode arguments already validated against the tool's fields.
    pub fn from_input(input: Value) -> Result<Self> {
        let escalate: Self = decode(ESCALATE, input)?;
        require_summary(ESCALATE, &escalate.summary)?;
        Ok(escalate)
    }
}

fn decode<T: serde::de::DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| Error::InvalidInput {
        tool: tool.into(),
        reason: e.to_string(),
    })
}

fn require_summary(tool: &str, summary: &str) -> Result<()> {
    if summary.trim().is_empty() {
        return Err(Error::InvalidInput {
            tool: tool.into(),
            reason: "summary must not be empty".into(),
        });
    }
    Ok(())
}
