//! Error types for the Blockfolio client

use crate::constants::UNINITIALIZED_MESSAGE;
use thiserror::Error;

/// Errors raised by a [`Transport`](crate::transport::Transport) implementation
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Service answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Request could not be turned into a URL
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

/// Errors surfaced by every client operation
///
/// `Display` and [`message`](Self::message) yield the same human-readable
/// text, whether the call was awaited or completed through a handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockfolioError {
    /// A portfolio-scoped call was made before `init()` succeeded
    #[error("{}", UNINITIALIZED_MESSAGE)]
    Uninitialized,

    /// The client token is malformed, disposable or refused by the service
    #[error("{0}")]
    InvalidToken(String),

    /// The device token is already active
    #[error("{0}")]
    AlreadyRegistered(String),

    /// A required argument is empty
    #[error("{0}")]
    MissingArgument(String),

    /// The pair references a symbol missing from the coin list
    #[error("{pair} is not an available token on Blockfolio!")]
    UnknownToken { pair: String },

    /// Arguments are present but unusable
    #[error("{0}")]
    Validation(String),

    /// Transport or service-side failure, message kept verbatim
    #[error("{0}")]
    Remote(String),
}

impl BlockfolioError {
    /// Human-readable message of the error
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Creates an InvalidToken error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    /// Creates a MissingArgument error
    pub fn missing_argument(msg: impl Into<String>) -> Self {
        Self::MissingArgument(msg.into())
    }

    /// Creates an UnknownToken error for the pair as the caller wrote it
    pub fn unknown_token(pair: &str) -> Self {
        Self::UnknownToken {
            pair: pair.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a Remote error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// True for errors detected locally, before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Uninitialized
                | Self::MissingArgument(_)
                | Self::UnknownToken { .. }
                | Self::Validation(_)
        )
    }
}

impl From<TransportError> for BlockfolioError {
    fn from(err: TransportError) -> Self {
        Self::Remote(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T, E = BlockfolioError> = std::result::Result<T, E>;
