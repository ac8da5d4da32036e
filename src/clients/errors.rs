//! Request error types.
//!
//! Terminal operations never return `Err`. Instead every problem met while
//! building or performing a request is pushed onto the outcome's error list,
//! which may be empty.
//!
//! # Error Kinds
//!
//! - **Transport**: connection refused, DNS failure, timeout. No response is
//!   available.
//! - **Decode**: the body could not be decoded into the requested type. The
//!   response and body are still returned.
//! - **Invalid request**: a header, query or body value was rejected while the
//!   request was being assembled. Nothing is sent.
//!
//! Non-2xx statuses are not errors at this layer; they arrive as a response
//! and the retry predicate decides what to do with them.
//!
//! # Example
//!
//! ```rust,ignore
//! use resilient_http::{Client, RequestError};
//!
//! let outcome = client.request().get(url).end().await;
//! for error in &outcome.errors {
//!     match error {
//!         RequestError::Transport(e) if e.is_timeout() => println!("timed out"),
//!         other => println!("request failed: {other}"),
//!     }
//! }
//! ```

use thiserror::Error;

/// An error collected while building or performing a request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Network or connection error, including deadline expiry.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded as JSON into the target type.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A header name or value was rejected.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// The header name as given.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A body value could not be merged into the request payload.
    #[error("Invalid request body: {reason}")]
    InvalidBody {
        /// Why it was rejected.
        reason: String,
    },

    /// A query value could not be turned into query parameters.
    #[error("Invalid query: {reason}")]
    InvalidQuery {
        /// Why it was rejected.
        reason: String,
    },

    /// A terminal operation was called before any method selector.
    #[error("No HTTP method set. Call get, post, put, head, delete or patch first.")]
    MissingMethod,
}

impl RequestError {
    /// Returns `true` if this error is a transport deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if this error happened while connecting.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Returns `true` if this error was raised before anything was sent.
    #[must_use]
    pub const fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader { .. }
                | Self::InvalidBody { .. }
                | Self::InvalidQuery { .. }
                | Self::MissingMethod
        )
    }
}
