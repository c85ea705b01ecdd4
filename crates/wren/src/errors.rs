use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a single tool request, recorded inside the conversation so the model can see them
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Whether the model caused this error by asking for something malformed.
    ///
    /// These are handed back to the model as tool results. Anything else means the tool
    /// itself could not do its job and the turn fails.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            AgentError::ToolNotFound(_) | AgentError::InvalidParameters(_)
        )
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Failures of a conversational turn, reported to whoever submitted it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TurnError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Responder unavailable: {0}")]
    ResponderUnavailable(String),

    #[error("Tool {tool} unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Gave up after {0} consecutive tool round-trips without a reply")]
    ToolRoundLimitExceeded(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TurnResult<T> = Result<T, TurnError>;
