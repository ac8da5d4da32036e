//! Client configuration.
//!
//! This module provides the policy values a [`crate::Client`] stamps into
//! every request session it issues.
//!
//! # Overview
//!
//! - [`ClientConfig`]: timeout, retry and backoff policy plus the retry predicate
//! - [`ClientConfigBuilder`]: a validating builder for [`ClientConfig`]
//! - [`ShouldRetry`]: the retry predicate type
//! - [`default_should_retry`]: retries only on responses with status above 499
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use resilient_http::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .timeout(Duration::from_secs(5))
//!     .retry(3, 2.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_retries(), 3);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::backoff::Backoff;
use crate::clients::{HttpResponse, RequestError};
use crate::error::ConfigError;

/// Default lower bound of the first retry delay.
pub const DEFAULT_MIN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Default width of the random range added to the first retry delay.
pub const DEFAULT_RETRY_DELAY_RANGE: Duration = Duration::from_millis(200);

/// Decides whether an attempt's outcome warrants another attempt.
///
/// Receives the normalized response (absent on transport failure), the raw
/// body bytes and the errors collected during the attempt.
///
/// It is only called for attempts that reached the network. A session whose
/// header, body, query or method was rejected during assembly returns those
/// errors without sending anything and without consulting the predicate.
pub type ShouldRetry =
    Arc<dyn Fn(Option<&HttpResponse>, &[u8], &[RequestError]) -> bool + Send + Sync>;

/// Wraps a closure as a [`ShouldRetry`] predicate.
///
/// The `Fn` bound gives the closure the signature the predicate type needs,
/// so parameter types can be left to inference.
pub fn should_retry_fn<F>(predicate: F) -> ShouldRetry
where
    F: Fn(Option<&HttpResponse>, &[u8], &[RequestError]) -> bool + Send + Sync + 'static,
{
    Arc::new(predicate)
}

/// The default retry predicate.
///
/// Retries only when a response was received and its status code is greater
/// than 499. Transport failures (including timeouts) and 4xx responses are
/// never retried.
#[must_use]
pub fn default_should_retry(
    response: Option<&HttpResponse>,
    _body: &[u8],
    _errors: &[RequestError],
) -> bool {
    response.is_some_and(|response| response.code() > 499)
}

/// Retry and timeout policy for a [`crate::Client`].
///
/// Sessions copy this value when they are created, so reconfiguring a
/// client never affects sessions that already exist.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone)]
pub struct ClientConfig {
    timeout: Option<Duration>,
    max_retries: u32,
    backoff: f64,
    min_retry_delay: Duration,
    retry_delay_range: Duration,
    should_retry: ShouldRetry,
    jitter_seed: Option<u64>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the connection timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the number of retries allowed after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the backoff multiplier.
    #[must_use]
    pub const fn backoff(&self) -> f64 {
        self.backoff
    }

    /// Returns the lower bound of the first retry delay.
    #[must_use]
    pub const fn min_retry_delay(&self) -> Duration {
        self.min_retry_delay
    }

    /// Returns the width of the jitter range for the first retry delay.
    #[must_use]
    pub const fn retry_delay_range(&self) -> Duration {
        self.retry_delay_range
    }

    /// Returns the retry predicate.
    #[must_use]
    pub const fn should_retry(&self) -> &ShouldRetry {
        &self.should_retry
    }

    /// Returns the fixed jitter seed, if one was configured.
    #[must_use]
    pub const fn jitter_seed(&self) -> Option<u64> {
        self.jitter_seed
    }

    /// Returns the retry engine policy derived from this configuration.
    #[must_use]
    pub const fn backoff_policy(&self) -> Backoff {
        Backoff::new(
            self.max_retries,
            self.backoff,
            self.min_retry_delay,
            self.retry_delay_range,
        )
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub(crate) fn set_retry(
        &mut self,
        max_retries: u32,
        backoff: f64,
        should_retry: Option<ShouldRetry>,
    ) -> Result<(), ConfigError> {
        validate_backoff(backoff)?;
        self.max_retries = max_retries;
        self.backoff = backoff;
        if let Some(should_retry) = should_retry {
            self.should_retry = should_retry;
        }
        Ok(())
    }

    pub(crate) fn set_retry_delay(&mut self, min: Duration, range: Duration) {
        self.min_retry_delay = min;
        self.retry_delay_range = range;
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_retries: 0,
            backoff: 0.0,
            min_retry_delay: DEFAULT_MIN_RETRY_DELAY,
            retry_delay_range: DEFAULT_RETRY_DELAY_RANGE,
            should_retry: Arc::new(default_should_retry),
            jitter_seed: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("min_retry_delay", &self.min_retry_delay)
            .field("retry_delay_range", &self.retry_delay_range)
            .field("should_retry", &"<fn>")
            .field("jitter_seed", &self.jitter_seed)
            .finish()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

fn validate_backoff(backoff: f64) -> Result<(), ConfigError> {
    if !backoff.is_finite() || backoff < 0.0 {
        return Err(ConfigError::InvalidBackoff { backoff });
    }
    if backoff > 0.0 && backoff < 1.0 {
        tracing::warn!(
            backoff,
            "backoff multiplier below 1 shrinks retry delays and can flood a failing server"
        );
    }
    Ok(())
}

/// Builder for constructing [`ClientConfig`] instances.
///
/// # Defaults
///
/// - `timeout`: `None` (no deadline)
/// - `max_retries`: `0` (a single attempt)
/// - `backoff`: `0.0`
/// - `min_retry_delay`: 100ms
/// - `retry_delay_range`: 200ms
/// - `should_retry`: [`default_should_retry`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use resilient_http::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .retry(5, 1.5)
///     .retry_delay(Duration::from_millis(50), Duration::from_millis(50))
///     .should_retry(|response, _body, errors| {
///         !errors.is_empty() || response.is_some_and(|r| r.code() == 429)
///     })
///     .build()
///     .unwrap();
///
/// assert!((config.backoff() - 1.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-connection deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Sets the retry count and backoff multiplier.
    ///
    /// A multiplier between 0 and 1 is accepted but makes every retry come
    /// sooner than the previous one.
    #[must_use]
    pub const fn retry(mut self, max_retries: u32, backoff: f64) -> Self {
        self.config.max_retries = max_retries;
        self.config.backoff = backoff;
        self
    }

    /// Sets the minimum first retry delay and its jitter range.
    #[must_use]
    pub const fn retry_delay(mut self, min: Duration, range: Duration) -> Self {
        self.config.min_retry_delay = min;
        self.config.retry_delay_range = range;
        self
    }

    /// Replaces the default retry predicate.
    #[must_use]
    pub fn should_retry<F>(mut self, should_retry: F) -> Self
    where
        F: Fn(Option<&HttpResponse>, &[u8], &[RequestError]) -> bool + Send + Sync + 'static,
    {
        self.config.should_retry = Arc::new(should_retry);
        self
    }

    /// Seeds the jitter source with a fixed value instead of the clock.
    #[must_use]
    pub const fn jitter_seed(mut self, seed: u64) -> Self {
        self.config.jitter_seed = Some(seed);
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBackoff`] if the multiplier is negative
    /// or not finite.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        validate_backoff(self.config.backoff)?;
        Ok(self.config)
    }
}
