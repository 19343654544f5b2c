use thiserror::Error;

use crate::domain::entities::account::AccountId;

/// Failure reported by the remote trading terminal or the channel used to reach it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TerminalError {
    /// The terminal answered but carried a non-empty error message
    #[error("{operation} rejected by terminal: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    #[error("failed to decode terminal reply: {0}")]
    Decode(String),
}

impl TerminalError {
    /// Everything that is not a business-level rejection from the terminal.
    pub fn is_transport(&self) -> bool {
        !matches!(self, TerminalError::Remote { .. })
    }
}

pub type TerminalResult<T> = Result<T, TerminalError>;

/// Errors surfaced by the session manager.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("invalid account: {0}")]
    InvalidAccount(AccountId),

    #[error("terminal rejected session for account {account}: {message}")]
    RemoteAuth { account: AccountId, message: String },

    #[error("could not reach terminal for account {account}: {message}")]
    Transport { account: AccountId, message: String },
}

impl SessionError {
    pub fn from_terminal(account: &AccountId, error: TerminalError) -> Self {
        match error {
            TerminalError::Remote { message, .. } => SessionError::RemoteAuth {
                account: account.clone(),
                message,
            },
            other => SessionError::Transport {
                account: account.clone(),
                message: other.to_string(),
            },
        }
    }
}

/// Validation failure of a single alert entry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlertError {
    #[error("alert entry is not an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has an invalid type, expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("invalid lot: {0}")]
    InvalidLot(#[from] LotError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LotError {
    #[error("`{0}` is not a decimal number")]
    NotANumber(String),

    #[error("lot must be non-negative, got {0}")]
    Negative(String),

    #[error("lot {0} is out of range")]
    OutOfRange(String),
}

/// Failure of one dispatched intent. Never aborts sibling intents.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntentError {
    #[error("order submission failed: {0}")]
    Submit(TerminalError),

    #[error("listing open positions failed: {0}")]
    Enumeration(TerminalError),
}

/// Request-level errors. Each one aborts the whole webhook call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Invalid account")]
    InvalidAccount(AccountId),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}
