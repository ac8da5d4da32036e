//! HTTP client types.
//!
//! This module provides the request-facing half of the crate: a factory
//! that holds shared transport state and policy, and the single-use
//! sessions it issues.
//!
//! # Overview
//!
//! - [`Client`]: the long-lived factory holding timeout, retry policy,
//!   transport and cookie jar
//! - [`RequestSession`]: one chainable HTTP exchange, consumed by a terminal call
//! - [`HttpResponse`]: the normalized response shape
//! - [`Outcome`]: response, body and errors returned by a terminal call
//! - [`HttpMethod`] and [`DataType`]: method and content-type hint
//! - [`RequestError`]: entries of an outcome's error list
//!
//! # Retry Behavior
//!
//! Each terminal call runs its exchange under the session's copy of the
//! client's retry policy:
//!
//! - The retry predicate sees every attempt's normalized response, body and errors
//! - By default only responses with a status above 499 are retried
//! - Transport failures, including timeouts, are not retried by default
//! - Only the final attempt's outcome is returned
//!
//! The default `max_retries` is 0, meaning a single attempt.

mod agent;
mod cookie_jar;
mod errors;
mod http_client;
mod http_request;
mod http_response;
mod session;

pub use cookie_jar::PublicSuffixJar;
pub use errors::RequestError;
pub use http_client::{Client, VERSION};
pub use http_request::{DataType, HttpMethod, UnknownDataType};
pub use http_response::{HttpResponse, Outcome};
pub use session::RequestSession;
