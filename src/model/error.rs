use chrono::{DateTime, Utc};
use thiserror::Error;

/// The standard result type used throughout the application.
pub type StdResult<T> = Result<T, anyhow::Error>;

/// The result type of a lookup and of its resource fetches.
pub type LookupOutcome<T> = Result<T, LookupError>;

/// Lookup error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The lookup key is empty or only whitespace.
    #[error("Invalid input: the lookup key is empty")]
    InvalidInput,

    /// The profile does not exist upstream.
    #[error("Profile not found")]
    NotFound,

    /// The upstream API rate limit is exhausted.
    #[error("Rate limited, reset at {reset_at:?}")]
    RateLimited {
        /// The time at which the rate limit resets, when advertised.
        reset_at: Option<DateTime<Utc>>,
    },

    /// The upstream API answered with an unexpected status.
    #[error("Upstream error: status {status}")]
    UpstreamError {
        /// The HTTP status code.
        status: u16,
    },

    /// A resource call did not complete in time.
    #[error("Request timed out")]
    Timeout,

    /// The request could not reach the upstream API.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The upstream API answered successfully with an undecodable body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The lookup was superseded by a newer one.
    #[error("Lookup cancelled")]
    Cancelled,
}

impl LookupError {
    /// Returns the short message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::InvalidInput => "Type a username to search.".to_string(),
            LookupError::NotFound => "User not found.".to_string(),
            LookupError::RateLimited {
                reset_at: Some(reset_at),
            } => format!(
                "Rate limit exceeded. Try again after {} UTC. Wait a minute and try again, or try a different username.",
                reset_at.format("%H:%M:%S")
            ),
            LookupError::RateLimited { reset_at: None } => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            LookupError::UpstreamError { status } => {
                format!("GitHub returned an error (status {status}).")
            }
            LookupError::Timeout => "Request timeout. Please try again.".to_string(),
            LookupError::NetworkError(_) => {
                "Network issue. Check your connection and try again.".to_string()
            }
            LookupError::InvalidResponse(_) => "Unexpected response from GitHub.".to_string(),
            LookupError::Cancelled => "Lookup cancelled.".to_string(),
        }
    }

    /// Whether the error belongs to a superseded lookup and must not be rendered.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LookupError::Cancelled)
    }
}
