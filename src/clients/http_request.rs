//! Request vocabulary types.
//!
//! This module provides [`HttpMethod`] and [`DataType`], the method and
//! content-type hint a request session is configured with.

use std::fmt;
use std::str::FromStr;

/// HTTP methods a request session can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP HEAD method.
    Head,
    /// HTTP DELETE method.
    Delete,
    /// HTTP PATCH method.
    Patch,
}

impl HttpMethod {
    /// Returns the matching `reqwest` method.
    #[must_use]
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Head => reqwest::Method::HEAD,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Head => write!(f, "HEAD"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// Content-type hint for request bodies.
///
/// Decides how values passed to `send` are encoded and which
/// `Content-Type` header is set when the caller did not set one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataType {
    /// JSON object body (`application/json`).
    #[default]
    Json,
    /// URL-encoded form body (`application/x-www-form-urlencoded`).
    Form,
    /// Plain text body (`text/plain`).
    Text,
    /// HTML body (`text/html`).
    Html,
    /// XML body (`application/xml`).
    Xml,
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Text => "text/plain",
            Self::Html => "text/html",
            Self::Xml => "application/xml",
        }
    }

    /// Returns `true` for hints whose string bodies are sent verbatim.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Text | Self::Html | Self::Xml)
    }
}

/// Error returned when a content-type hint name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown data type '{0}'. Expected one of: json, form, urlencoded, text, html, xml.")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "form" | "urlencoded" | "form-urlencoded" => Ok(Self::Form),
            "text" | "plain" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "xml" => Ok(Self::Xml),
            _ => Err(UnknownDataType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Head.to_string(), "HEAD");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_http_method_maps_to_reqwest() {
        assert_eq!(HttpMethod::Patch.as_reqwest(), reqwest::Method::PATCH);
        assert_eq!(HttpMethod::Head.as_reqwest(), reqwest::Method::HEAD);
    }

    #[test]
    fn test_data_type_content_type() {
        assert_eq!(DataType::Json.as_content_type(), "application/json");
        assert_eq!(
            DataType::Form.as_content_type(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(DataType::Text.as_content_type(), "text/plain");
        assert_eq!(DataType::Xml.as_content_type(), "application/xml");
    }

    #[test]
    fn test_data_type_parses_short_names() {
        assert_eq!("json".parse::<DataType>(), Ok(DataType::Json));
        assert_eq!("form".parse::<DataType>(), Ok(DataType::Form));
        assert_eq!("urlencoded".parse::<DataType>(), Ok(DataType::Form));
        assert_eq!("TEXT".parse::<DataType>(), Ok(DataType::Text));
        assert_eq!("html".parse::<DataType>(), Ok(DataType::Html));
        assert_eq!("xml".parse::<DataType>(), Ok(DataType::Xml));
    }

    #[test]
    fn test_data_type_rejects_unknown_names() {
        let error = "yaml".parse::<DataType>().unwrap_err();
        assert!(error.to_string().contains("yaml"));
    }

    #[test]
    fn test_default_data_type_is_json() {
        assert_eq!(DataType::default(), DataType::Json);
        assert!(!DataType::Json.is_raw());
        assert!(DataType::Xml.is_raw());
    }
}
