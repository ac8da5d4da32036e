//! Cookie storage shared by every session of a client.
//!
//! [`PublicSuffixJar`] wraps `reqwest`'s in-memory [`Jar`] and refuses
//! cookies whose `Domain` attribute names a public suffix (such as `co.uk`
//! or `github.io`) unless the response came from that exact host. Without
//! this check any site under a shared suffix could plant cookies that are
//! then sent to every other site under it.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::Url;

/// A cookie jar that respects public suffix boundaries.
#[derive(Debug, Default)]
pub struct PublicSuffixJar {
    inner: Jar,
}

impl PublicSuffixJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for PublicSuffixJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let mut accepted = cookie_headers.filter(|header| {
            let domain = header
                .to_str()
                .ok()
                .and_then(|value| cookie::Cookie::parse(value).ok())
                .and_then(|parsed| parsed.domain().map(str::to_ascii_lowercase));
            let allowed = domain_allowed(domain.as_deref(), &host);
            if !allowed {
                tracing::debug!(%host, ?domain, "rejected cookie scoped to a public suffix");
            }
            allowed
        });
        self.inner.set_cookies(&mut accepted, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.inner.cookies(url)
    }
}

/// A `Domain` that is itself a public suffix is only allowed from that host.
fn domain_allowed(domain: Option<&str>, host: &str) -> bool {
    let Some(domain) = domain.map(|d| d.trim_start_matches('.')) else {
        return true;
    };
    if domain.is_empty() {
        return true;
    }
    psl::suffix_str(domain) != Some(domain) || domain == host
}
