//! # resilient-http
//!
//! A chainable HTTP request facade that adds connection timeouts and
//! configurable retries with jittered exponential backoff.
//!
//! ## Overview
//!
//! This crate provides:
//! - A reusable [`Client`] factory holding the shared transport, cookie jar
//!   and retry policy
//! - Single-use, chainable [`RequestSession`]s for one HTTP exchange each
//! - A generic [`Backoff`] retry engine, independent of HTTP
//! - A replaceable retry predicate, defaulting to "retry on 5xx"
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use resilient_http::{Client, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .timeout(Duration::from_secs(2))
//!     .retry(3, 2.0)
//!     .build()?;
//! let client = Client::with_config(config)?;
//!
//! let outcome = client
//!     .request()
//!     .get("https://api.example.com/orders")
//!     .set("Accept", "application/json")
//!     .query("limit=50")
//!     .end()
//!     .await;
//!
//! for error in &outcome.errors {
//!     eprintln!("request error: {error}");
//! }
//! ```
//!
//! ## Decoding JSON
//!
//! ```rust,ignore
//! #[derive(serde::Deserialize)]
//! struct Order {
//!     id: u64,
//!     status: String,
//! }
//!
//! let (outcome, order) = client
//!     .request()
//!     .get("https://api.example.com/orders/1")
//!     .end_struct::<Order>()
//!     .await;
//! ```
//!
//! ## Custom Retry Predicate
//!
//! ```rust
//! use resilient_http::ClientConfig;
//!
//! // Also retry transport failures such as timeouts.
//! let config = ClientConfig::builder()
//!     .retry(4, 2.0)
//!     .should_retry(|response, _body, errors| match response {
//!         Some(response) => response.code() > 499,
//!         None => !errors.is_empty(),
//!     })
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: policy lives in a [`Client`] and is copied into
//!   each session when the session is created
//! - **Single owner**: sessions are consumed by their terminal call
//! - **No panics on failure**: terminal calls return an error list instead
//!   of `Err`
//! - **Async-first**: designed for the Tokio runtime

pub mod backoff;
pub mod clients;
pub mod config;
pub mod error;

pub use backoff::{Backoff, RetryState};
pub use config::{
    default_should_retry, should_retry_fn, ClientConfig, ClientConfigBuilder, ShouldRetry,
};
pub use error::ConfigError;

pub use clients::{
    Client, DataType, HttpMethod, HttpResponse, Outcome, PublicSuffixJar, RequestError,
    RequestSession, UnknownDataType,
};
