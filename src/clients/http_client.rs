//! The client factory.
//!
//! This module provides [`Client`], a long-lived holder of the shared
//! transport, cookie jar and retry policy, which stamps out
//! [`RequestSession`]s.

use std::sync::Arc;
use std::time::Duration;

use crate::clients::cookie_jar::PublicSuffixJar;
use crate::clients::session::RequestSession;
use crate::config::{ClientConfig, ShouldRetry};
use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Factory for request sessions with timeout and retry support.
///
/// Construct one per application and reuse it: every session it issues
/// shares the same connection pool and cookie jar, so cookies set by one
/// response are sent on later requests to the same domain. Cookies scoped
/// to a public suffix such as `co.uk` are refused.
///
/// # Thread Safety
///
/// `Client` is `Send + Sync`. Many sessions may be created and executed
/// concurrently from one client; each session's own state is private to it.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use resilient_http::Client;
///
/// let mut client = Client::new()?;
/// client
///     .set_timeout(Duration::from_secs(2))?
///     .set_retry(3, 2.0, None)?;
///
/// let outcome = client.request().get("https://example.com/health").end().await;
/// ```
#[derive(Debug)]
pub struct Client {
    /// Shared transport; cheap to clone into sessions.
    http: reqwest::Client,
    /// Cookie jar shared by every transport this client builds.
    cookie_jar: Arc<PublicSuffixJar>,
    config: ClientConfig,
}

// Verify Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

impl Client {
    /// Creates a client with the default policy.
    ///
    /// The default makes a single attempt with no timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the transport cannot be built.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the transport cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self, ConfigError> {
        let cookie_jar = Arc::new(PublicSuffixJar::new());
        let http = build_transport(&cookie_jar, config.timeout())?;
        Ok(Self {
            http,
            cookie_jar,
            config,
        })
    }

    /// Returns the current policy.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the shared cookie jar.
    #[must_use]
    pub const fn cookie_jar(&self) -> &Arc<PublicSuffixJar> {
        &self.cookie_jar
    }

    /// Sets the per-connection deadline.
    ///
    /// Connecting and the whole exchange on that connection must finish
    /// within `timeout`, so a remote that accepts but never answers still
    /// fails. The transport is rebuilt; sessions issued earlier keep the
    /// transport they were given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the transport cannot be rebuilt.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<&mut Self, ConfigError> {
        self.http = build_transport(&self.cookie_jar, Some(timeout))?;
        self.config.set_timeout(timeout);
        Ok(self)
    }

    /// Sets the retry count, backoff multiplier and, optionally, predicate.
    ///
    /// When `should_retry` is `None` the current predicate is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBackoff`] if `backoff` is negative or
    /// not finite. The previous policy is left untouched.
    pub fn set_retry(
        &mut self,
        max_retries: u32,
        backoff: f64,
        should_retry: Option<ShouldRetry>,
    ) -> Result<&mut Self, ConfigError> {
        self.config.set_retry(max_retries, backoff, should_retry)?;
        Ok(self)
    }

    /// Sets the minimum first retry delay and its jitter range.
    pub fn set_retry_delay(&mut self, min: Duration, range: Duration) -> &mut Self {
        self.config.set_retry_delay(min, range);
        self
    }

    /// Starts a new request session.
    ///
    /// The session receives a copy of the current policy and a handle to the
    /// shared transport.
    pub fn request(&self) -> RequestSession {
        RequestSession::new(self.http.clone(), self.config.clone())
    }
}

fn build_transport(
    cookie_jar: &Arc<PublicSuffixJar>,
    timeout: Option<Duration>,
) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .cookie_provider(Arc::clone(cookie_jar))
        .user_agent(format!("resilient-http/{VERSION}"));

    if let Some(timeout) = timeout {
        builder = builder.connect_timeout(timeout).timeout(timeout);
    }

    Ok(builder.build()?)
}
