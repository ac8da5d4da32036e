//! Response types.
//!
//! This module provides [`HttpResponse`], the standard response shape handed
//! to callers and to the retry predicate, and [`Outcome`], the result of a
//! terminal request operation.
//!
//! The request builder produces its own native response type; it is
//! converted into [`HttpResponse`] field for field, with an absent native
//! response mapping to an absent `HttpResponse`. Callers and predicates only
//! ever see the normalized shape.

use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url, Version};

/// An HTTP response, without its body.
///
/// The body is returned separately by each terminal operation, as text or
/// bytes. Fields use the `http` types re-exported by `reqwest`, so ordinary
/// HTTP tooling works on them.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The HTTP version negotiated for the exchange.
    pub version: Version,
    /// Response headers.
    pub headers: HeaderMap,
    /// The final URL, after redirects.
    pub url: Option<Url>,
}

impl HttpResponse {
    /// Creates a response with the given status and headers.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers,
            url: None,
        }
    }

    /// Returns the numeric status code.
    #[must_use]
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the first value of the named header, if it is valid text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// The result of a terminal request operation.
///
/// Holds the final attempt's response (absent on transport failure), body
/// and errors. Outcomes of earlier attempts are not kept.
#[derive(Debug)]
pub struct Outcome<B> {
    /// The normalized response, if one was received.
    pub response: Option<HttpResponse>,
    /// The response body.
    pub body: B,
    /// Errors collected during the final attempt.
    pub errors: Vec<crate::clients::RequestError>,
}

impl<B> Outcome<B> {
    /// Splits the outcome into its `(response, body, errors)` parts.
    pub fn into_parts(self) -> (Option<HttpResponse>, B, Vec<crate::clients::RequestError>) {
        (self.response, self.body, self.errors)
    }

    /// Returns `true` if no errors were collected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the response status code, if a response was received.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        self.response.as_ref().map(HttpResponse::code)
    }

    pub(crate) fn map_body<T>(self, f: impl FnOnce(B) -> T) -> Outcome<T> {
        Outcome {
            response: self.response,
            body: f(self.body),
            errors: self.errors,
        }
    }
}
