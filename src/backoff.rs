//! Bounded retry with jittered exponential backoff.
//!
//! This module provides [`Backoff`], a generic retry controller that knows
//! nothing about HTTP. It repeatedly drives an attempt future, asks a
//! decision function whether the produced outcome warrants another attempt,
//! and sleeps between attempts.
//!
//! # Delay Schedule
//!
//! - The first retry waits `min_delay + uniform[0, jitter)`.
//! - Every later retry waits `previous * multiplier`. No further randomness
//!   is injected after the first delay.
//!
//! A multiplier of `0.0` makes every retry after the first immediate. A
//! multiplier between `0.0` and `1.0` produces shrinking delays, which is
//! accepted as a policy choice (see [`crate::ClientConfigBuilder::retry`]).
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use resilient_http::Backoff;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let backoff = Backoff::new(3, 2.0, Duration::from_millis(1), Duration::ZERO);
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut calls = 0;
//!
//! let last = backoff
//!     .run(&mut rng, || { calls += 1; std::future::ready(calls) }, |n| *n < 2)
//!     .await;
//!
//! assert_eq!(last, 2);
//! # });
//! ```

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Retry policy values for one terminal call.
///
/// `max_retries = N` allows at most `N + 1` attempts in total. The count
/// saturates, so `u32::MAX` retries allow `u32::MAX` attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backoff {
    max_retries: u32,
    multiplier: f64,
    min_delay: Duration,
    jitter: Duration,
}

impl Backoff {
    /// Creates a new retry policy.
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Retries allowed after the first attempt
    /// * `multiplier` - Factor applied to the previous delay for each later retry
    /// * `min_delay` - Lower bound of the first retry delay
    /// * `jitter` - Width of the random range added to the first retry delay
    ///
    /// The multiplier is not validated here. A negative or NaN multiplier
    /// makes every retry after the first immediate, and an overflowing
    /// delay is clamped to `Duration::MAX`.
    #[must_use]
    pub const fn new(max_retries: u32, multiplier: f64, min_delay: Duration, jitter: Duration) -> Self {
        Self {
            max_retries,
            multiplier,
            min_delay,
            jitter,
        }
    }

    /// Returns the number of retries allowed after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the backoff multiplier.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Returns the total number of attempts this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Starts a fresh retry state drawing jitter from `rng`.
    pub fn state<'a, R: Rng>(&self, rng: &'a mut R) -> RetryState<'a, R> {
        RetryState {
            attempts: 0,
            delay: Duration::ZERO,
            max_attempts: self.max_attempts(),
            multiplier: self.multiplier,
            min_delay: self.min_delay,
            jitter: self.jitter,
            rng,
        }
    }

    /// Drives `attempt` until `should_retry` declines or attempts run out.
    ///
    /// `should_retry` is consulted after every attempt, including the last
    /// one, whose answer is ignored. The outcome of the final attempt is
    /// returned; earlier outcomes are dropped.
    pub async fn run<R, O, F, Fut, P>(&self, rng: &mut R, mut attempt: F, mut should_retry: P) -> O
    where
        R: Rng,
        F: FnMut() -> Fut,
        Fut: Future<Output = O>,
        P: FnMut(&O) -> bool,
    {
        let mut state = self.state(rng);
        loop {
            let outcome = attempt().await;
            state.record_attempt();

            if !should_retry(&outcome) || state.is_exhausted() {
                return outcome;
            }

            let delay = state.next_delay();
            tracing::debug!(
                attempt = state.attempts(),
                max_attempts = state.max_attempts(),
                delay_ms = delay.as_millis(),
                "retrying after backoff"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Like [`run`](Self::run), with a fresh random source seeded from the clock.
    pub async fn run_seeded_from_clock<O, F, Fut, P>(&self, attempt: F, should_retry: P) -> O
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = O>,
        P: FnMut(&O) -> bool,
    {
        let mut rng = clock_seeded_rng();
        self.run(&mut rng, attempt, should_retry).await
    }
}

/// Per-call retry bookkeeping.
///
/// Lives for one [`Backoff::run`] invocation.
#[derive(Debug)]
pub struct RetryState<'a, R> {
    attempts: u32,
    delay: Duration,
    max_attempts: u32,
    multiplier: f64,
    min_delay: Duration,
    jitter: Duration,
    rng: &'a mut R,
}

impl<R: Rng> RetryState<'_, R> {
    /// Returns the number of attempts made so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the total number of attempts allowed.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the most recently computed delay.
    #[must_use]
    pub const fn current_delay(&self) -> Duration {
        self.delay
    }

    /// Marks one attempt as taken.
    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Returns true once no further attempts are allowed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Computes the delay before the next attempt.
    ///
    /// The first call draws jitter; later calls scale the previous delay.
    pub fn next_delay(&mut self) -> Duration {
        self.delay = if self.attempts <= 1 {
            self.min_delay.saturating_add(self.draw_jitter())
        } else {
            scale(self.delay, self.multiplier)
        };
        self.delay
    }

    fn draw_jitter(&mut self) -> Duration {
        let range = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
        if range == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.rng.gen_range(0..range))
    }
}

fn scale(delay: Duration, multiplier: f64) -> Duration {
    let secs = delay.as_secs_f64() * multiplier;
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Builds a random source seeded from the current time.
#[must_use]
pub fn clock_seeded_rng() -> StdRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    // Truncation keeps the fast-moving low bits.
    #[allow(clippy::cast_possible_truncation)]
    let seed = nanos as u64;
    StdRng::seed_from_u64(seed)
}
