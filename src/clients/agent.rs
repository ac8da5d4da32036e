//! Chainable request builder over `reqwest`.
//!
//! [`Agent`] accumulates everything a request needs (method, URL, headers,
//! query pairs, body payload, content-type hint) and performs one exchange
//! per call to [`Agent::end_bytes`]. It has no notion of retries; the
//! request session wraps it for that.
//!
//! # Body Merging
//!
//! Values passed to [`Agent::send`] are combined as follows:
//!
//! - JSON objects, given as structs, maps or JSON strings, are merged key by
//!   key into one object. Later keys overwrite earlier ones.
//! - Other strings are read as `a=b&c=d` form pairs and appended. Unless a
//!   content-type hint was set explicitly, this switches the hint to form.
//! - With a text, HTML or XML hint, strings are appended verbatim.
//!
//! When the request is sent, the hint picks the encoding. JSON sends the
//! merged object; form sends every pair, sorted by key, with JSON data
//! flattened into it.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url, Version};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::clients::errors::RequestError;
use crate::clients::http_request::{DataType, HttpMethod};
use crate::clients::http_response::HttpResponse;

/// The builder's own view of a received response.
#[derive(Debug)]
pub(crate) struct RawResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: Url,
}

impl RawResponse {
    fn from_reqwest(response: &reqwest::Response) -> Self {
        Self {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        }
    }
}

impl From<RawResponse> for HttpResponse {
    fn from(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            version: raw.version,
            headers: raw.headers,
            url: Some(raw.url),
        }
    }
}

/// Converts the builder's response into the standard shape.
pub(crate) fn normalize(raw: Option<RawResponse>) -> Option<HttpResponse> {
    raw.map(HttpResponse::from)
}

/// Accumulated state for one request.
#[derive(Debug)]
pub(crate) struct Agent {
    client: reqwest::Client,
    method: Option<HttpMethod>,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    data: Map<String, Value>,
    form: Vec<(String, String)>,
    raw: String,
    data_type: DataType,
    explicit_type: bool,
    basic_auth: Option<(String, Option<String>)>,
    debug: bool,
    errors: Vec<RequestError>,
}

impl Agent {
    pub(crate) fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            method: None,
            url: String::new(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            data: Map::new(),
            form: Vec::new(),
            raw: String::new(),
            data_type: DataType::Json,
            explicit_type: false,
            basic_auth: None,
            debug: false,
            errors: Vec::new(),
        }
    }

    pub(crate) fn method(&mut self, method: HttpMethod, url: String) {
        self.method = Some(method);
        self.url = url;
    }

    pub(crate) fn set(&mut self, name: &str, value: &str) {
        let name_parsed = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.reject_header(name, &e);
                return;
            }
        };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name_parsed, value);
            }
            Err(e) => self.reject_header(name, &e),
        }
    }

    fn reject_header(&mut self, name: &str, reason: &dyn std::fmt::Display) {
        self.errors.push(RequestError::InvalidHeader {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }

    pub(crate) fn data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
        self.explicit_type = true;
    }

    pub(crate) fn basic_auth(&mut self, username: String, password: Option<String>) {
        self.basic_auth = Some((username, password));
    }

    pub(crate) fn debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub(crate) fn query<T: Serialize + ?Sized>(&mut self, content: &T) {
        let reject = |reason: String| RequestError::InvalidQuery { reason };
        match serde_json::to_value(content) {
            Ok(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
                Ok(Value::Object(map)) => self.query.extend(flatten(map)),
                _ => match parse_pairs(&s) {
                    Ok(pairs) => self.query.extend(pairs),
                    Err(reason) => self.errors.push(reject(reason)),
                },
            },
            Ok(Value::Object(map)) => self.query.extend(flatten(map)),
            Ok(Value::Null) => {}
            Ok(other) => self.errors.push(reject(format!(
                "expected an object or a query string, got {}",
                kind(&other)
            ))),
            Err(e) => self.errors.push(reject(e.to_string())),
        }
    }

    pub(crate) fn send<T: Serialize + ?Sized>(&mut self, content: &T) {
        match serde_json::to_value(content) {
            Ok(Value::String(s)) => self.send_string(&s),
            Ok(Value::Object(map)) => self.data.extend(map),
            Ok(Value::Null) => {}
            Ok(other) => self.errors.push(RequestError::InvalidBody {
                reason: format!("expected an object or a string, got {}", kind(&other)),
            }),
            Err(e) => self.errors.push(RequestError::InvalidBody {
                reason: e.to_string(),
            }),
        }
    }

    fn send_string(&mut self, content: &str) {
        if self.data_type.is_raw() {
            self.raw.push_str(content);
            return;
        }
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) {
            self.data.extend(map);
            return;
        }
        if content.trim().is_empty() {
            return;
        }
        match parse_pairs(content) {
            Ok(pairs) => {
                self.form.extend(pairs);
                if !self.explicit_type {
                    self.data_type = DataType::Form;
                }
            }
            Err(reason) => self.errors.push(RequestError::InvalidBody { reason }),
        }
    }

    /// Drains errors that prevent the request from being sent at all.
    pub(crate) fn preflight(&mut self) -> Vec<RequestError> {
        let mut errors = std::mem::take(&mut self.errors);
        if self.method.is_none() {
            errors.push(RequestError::MissingMethod);
        }
        errors
    }

    /// Encodes the accumulated payload according to the content-type hint.
    pub(crate) fn encode_body(&self) -> Option<Vec<u8>> {
        match self.data_type {
            DataType::Json => {
                let mut object = self.data.clone();
                for (key, value) in &self.form {
                    object
                        .entry(key.clone())
                        .or_insert_with(|| Value::String(value.clone()));
                }
                (!object.is_empty()).then(|| Value::Object(object).to_string().into_bytes())
            }
            DataType::Form => {
                let mut pairs = self.form.clone();
                pairs.extend(flatten(self.data.clone()));
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                (!pairs.is_empty()).then(|| encode_pairs(&pairs).into_bytes())
            }
            DataType::Text | DataType::Html | DataType::Xml => {
                if !self.raw.is_empty() {
                    Some(self.raw.clone().into_bytes())
                } else if !self.data.is_empty() {
                    Some(Value::Object(self.data.clone()).to_string().into_bytes())
                } else {
                    None
                }
            }
        }
    }

    fn build(&self) -> Result<reqwest::Request, RequestError> {
        let method = self.method.ok_or(RequestError::MissingMethod)?;
        let mut builder = self
            .client
            .request(method.as_reqwest(), self.url.as_str())
            .headers(self.headers.clone());

        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if let Some((username, password)) = &self.basic_auth {
            builder = builder.basic_auth(username, password.as_ref());
        }
        if let Some(body) = self.encode_body() {
            if !self.headers.contains_key(CONTENT_TYPE) {
                builder = builder.header(CONTENT_TYPE, self.data_type.as_content_type());
            }
            builder = builder.body(body);
        }

        Ok(builder.build()?)
    }

    /// Performs one exchange and returns the body as bytes.
    pub(crate) async fn end_bytes(&self) -> (Option<RawResponse>, Vec<u8>, Vec<RequestError>) {
        let request = match self.build() {
            Ok(request) => request,
            Err(e) => return (None, Vec::new(), vec![e]),
        };

        if self.debug {
            tracing::debug!(
                method = %request.method(),
                url = %request.url(),
                headers = ?request.headers(),
                body = %request
                    .body()
                    .and_then(reqwest::Body::as_bytes)
                    .map(String::from_utf8_lossy)
                    .unwrap_or_default(),
                "sending request"
            );
        }

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                if self.debug {
                    tracing::debug!(error = %e, "request failed");
                }
                return (None, Vec::new(), vec![e.into()]);
            }
        };

        let raw = RawResponse::from_reqwest(&response);
        let (body, errors) = match response.bytes().await {
            Ok(bytes) => (bytes.to_vec(), Vec::new()),
            Err(e) => (Vec::new(), vec![RequestError::from(e)]),
        };

        if self.debug {
            tracing::debug!(
                status = raw.status.as_u16(),
                headers = ?raw.headers,
                body = %String::from_utf8_lossy(&body),
                "received response"
            );
        }

        (Some(raw), body, errors)
    }
}

/// Parses an `a=b&c=d` string into decoded pairs.
fn parse_pairs(content: &str) -> Result<Vec<(String, String)>, String> {
    content
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(component: &str) -> Result<String, String> {
    urlencoding::decode(&component.replace('+', " "))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| format!("invalid percent-encoding in '{component}': {e}"))
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Turns a JSON object into string pairs; arrays repeat their key.
fn flatten(map: Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar(item)));
                }
            }
            other => pairs.push((key, scalar(other))),
        }
    }
    pairs
}

fn scalar(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
