//! Configuration error types.
//!
//! This module contains the error returned when a client configuration is
//! rejected or the shared transport cannot be constructed.
//!
//! # Error Handling
//!
//! Configuration is validated fail-fast: [`crate::ClientConfigBuilder::build`]
//! and the [`crate::Client`] setters return `Result<_, ConfigError>`.
//! Errors raised while performing a request are never reported here; they
//! are accumulated in the request's error list as [`crate::RequestError`].
//!
//! # Example
//!
//! ```rust
//! use resilient_http::{ClientConfig, ConfigError};
//!
//! let result = ClientConfig::builder().retry(3, -1.0).build();
//! assert!(matches!(result, Err(ConfigError::InvalidBackoff { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring a client.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backoff multiplier is negative, NaN or infinite.
    #[error("Invalid backoff multiplier {backoff}. Expected a finite value greater than or equal to 0.")]
    InvalidBackoff {
        /// The rejected multiplier.
        backoff: f64,
    },

    /// The underlying HTTP transport could not be built.
    #[error("Failed to build HTTP transport: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_backoff_error_message() {
        let error = ConfigError::InvalidBackoff { backoff: -2.5 };
        let message = error.to_string();
        assert!(message.contains("-2.5"));
        assert!(message.contains("greater than or equal to 0"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::InvalidBackoff { backoff: f64::NAN };
        let _: &dyn std::error::Error = &error;
    }
}
