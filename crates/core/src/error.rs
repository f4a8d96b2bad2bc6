//! Dispatcher error taxonomy.

use compact_str::CompactString;
use thiserror::Error;

/// Result alias over the dispatcher [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while wiring or running agents.
///
/// Configuration errors (`UnknownTool`, `DuplicateToolName`,
/// `DuplicateAgent`, `MissingGeneralist`, `InvalidConfig`) surface at
/// build time. During a turn, only [`Error::is_turn_fatal`] errors end the
/// turn; the rest are fed back to the model as observations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("tool `{0}` is not registered")]
    UnknownTool(CompactString),
    #[error("tool `{0}` is already registered")]
    DuplicateToolName(CompactString),
    #[error("`{0}` is not a registered domain")]
    UnknownDomain(CompactString),
    #[error("malformed agent output: {0}")]
    MalformedAgentOutput(String),
    #[error("agent `{agent}` made {limit} tool rounds without a final reply")]
    ToolLoopExceeded { agent: CompactString, limit: usize },
    #[error("completion service unavailable: {0}")]
    CompletionUnavailable(String),
    #[error("invalid input for `{tool}`: {reason}")]
    InvalidInput { tool: CompactString, reason: String },
    #[error("tool `{tool}` failed: {message}")]
    Tool { tool: CompactString, message: String },
    #[error("transfer refused: {0}")]
    TransferRefused(String),
    #[error("agent `{0}` is already registered")]
    DuplicateAgent(CompactString),
    #[error("no generalist agent configured")]
    MissingGeneralist,
    #[error("invalid dispatcher config: {0}")]
    InvalidConfig(String),
    #[error("agent `{0}` is not registered")]
    UnknownAgent(CompactString),
}

impl Error {
    /// Whether this error aborts the current turn instead of being
    /// reported back to the model.
    pub fn is_turn_fatal(&self) -> bool {
        matches!(
            self,
            Error::ToolLoopExceeded { .. } | Error::CompletionUnavailable(_)
        )
    }
}
