//! Single-use request sessions.
//!
//! A [`RequestSession`] describes one logical HTTP exchange. It is built by
//! chaining calls, then consumed by exactly one terminal operation, which
//! performs the exchange under the retry policy the issuing
//! [`crate::Client`] had when the session was created.
//!
//! # Ownership
//!
//! Every chain method takes the session by value and hands it back, and
//! every terminal operation consumes it. A session cannot be cloned, so it
//! cannot be shared between concurrent tasks or executed twice.
//!
//! # Example
//!
//! ```rust,ignore
//! use resilient_http::Client;
//!
//! let client = Client::new()?;
//! let outcome = client
//!     .request()
//!     .post("https://api.example.com/items")
//!     .set("API-Key", "secret")
//!     .send(r#"{"name":"widget"}"#)
//!     .end()
//!     .await;
//!
//! if let Some(response) = &outcome.response {
//!     println!("{}: {}", response.code(), outcome.body);
//! }
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clients::agent::{normalize, Agent};
use crate::clients::errors::RequestError;
use crate::clients::http_request::{DataType, HttpMethod};
use crate::clients::http_response::Outcome;
use crate::config::ClientConfig;

/// One chainable, single-use HTTP exchange.
///
/// Obtained from [`crate::Client::request`]. Holds its own copy of the
/// client's policy; later changes to the client do not reach it.
#[derive(Debug)]
#[must_use = "a request session does nothing until a terminal operation is awaited"]
pub struct RequestSession {
    agent: Agent,
    config: ClientConfig,
}

// Sessions move between tasks but are never shared.
const _: fn() = || {
    const fn assert_send<T: Send>() {}
    assert_send::<RequestSession>();
};

impl RequestSession {
    pub(crate) fn new(client: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            agent: Agent::new(client),
            config,
        }
    }

    /// Returns the policy this session will run under.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Selects an HTTP method and target URL.
    pub fn method(mut self, method: HttpMethod, url: impl Into<String>) -> Self {
        self.agent.method(method, url.into());
        self
    }

    /// Makes this a GET request.
    pub fn get(self, url: impl Into<String>) -> Self {
        self.method(HttpMethod::Get, url)
    }

    /// Makes this a POST request.
    pub fn post(self, url: impl Into<String>) -> Self {
        self.method(HttpMethod::Post, url)
    }

    /// Makes this a PUT request.
    pub fn put(self, url: impl Into<String>) -> Self {
        self.method(HttpMethod::Put, url)
    }

    /// Makes this a HEAD request.
    pub fn head(self, url: impl Into<String>) -> Self {
        self.method(HttpMethod::Head, url)
    }

    /// Makes this a DELETE request.
    pub fn delete(self, url: impl Into<String>) -> Self {
        self.method(HttpMethod::Delete, url)
    }

    /// Makes this a PATCH request.
    pub fn patch(self, url: impl Into<String>) -> Self {
        self.method(HttpMethod::Patch, url)
    }

    /// Sets one header. Names are case-insensitive; the last write wins.
    pub fn set(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.agent.set(name.as_ref(), value.as_ref());
        self
    }

    /// Sets every header in `headers`.
    pub fn set_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in headers {
            self.agent.set(name.as_ref(), value.as_ref());
        }
        self
    }

    /// Sets the content-type hint used to encode the body.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.agent.data_type(data_type);
        self
    }

    /// Appends query parameters.
    ///
    /// Accepts a pre-encoded `a=b&c=d` string, a JSON object string, or any
    /// value that serializes to an object. Duplicate keys are kept in order.
    pub fn query<T: Serialize + ?Sized>(mut self, content: &T) -> Self {
        self.agent.query(content);
        self
    }

    /// Adds content to the request body.
    ///
    /// Objects are merged into one JSON object across calls; plain strings
    /// are read as form pairs. See the content-type hint for how the result
    /// is encoded.
    pub fn send<T: Serialize + ?Sized>(mut self, content: &T) -> Self {
        self.agent.send(content);
        self
    }

    /// Sets HTTP basic authentication.
    pub fn basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.agent.basic_auth(username.into(), password);
        self
    }

    /// Enables logging of every exchange at `debug` level.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.agent.debug(enabled);
        self
    }

    /// Performs the request and returns the body as text.
    ///
    /// Invalid UTF-8 in the body is replaced with `U+FFFD` and no error is
    /// recorded. Use [`end_bytes`](Self::end_bytes) for binary bodies.
    pub async fn end(self) -> Outcome<String> {
        self.execute()
            .await
            .map_body(|body| String::from_utf8_lossy(&body).into_owned())
    }

    /// Performs the request and returns the body as bytes.
    pub async fn end_bytes(self) -> Outcome<Vec<u8>> {
        self.execute().await
    }

    /// Performs the request and decodes the JSON body into `T`.
    ///
    /// A decode failure is appended to the outcome's errors; the response
    /// and body are still returned.
    pub async fn end_struct<T: DeserializeOwned>(self) -> (Outcome<Vec<u8>>, Option<T>) {
        let mut outcome = self.execute().await;
        match serde_json::from_slice(&outcome.body) {
            Ok(value) => (outcome, Some(value)),
            Err(e) => {
                outcome.errors.push(RequestError::Decode(e));
                (outcome, None)
            }
        }
    }

    async fn execute(self) -> Outcome<Vec<u8>> {
        let Self { mut agent, config } = self;

        let errors = agent.preflight();
        if !errors.is_empty() {
            return Outcome {
                response: None,
                body: Vec::new(),
                errors,
            };
        }

        let agent = &agent;
        let should_retry = config.should_retry();
        let attempt = || async move {
            let (raw, body, errors) = agent.end_bytes().await;
            Outcome {
                response: normalize(raw),
                body,
                errors,
            }
        };
        let decide = |outcome: &Outcome<Vec<u8>>| {
            should_retry(outcome.response.as_ref(), &outcome.body, &outcome.errors)
        };

        let policy = config.backoff_policy();
        if let Some(seed) = config.jitter_seed() {
            let mut rng = StdRng::seed_from_u64(seed);
            policy.run(&mut rng, attempt, decide).await
        } else {
            policy.run_seeded_from_clock(attempt, decide).await
        }
    }
}
