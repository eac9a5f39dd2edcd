//! JSON request helper shared by every dashboard panel.
//!
//! All backend calls go through [`ApiClient::fetch_json`], which is the only
//! place where network failures, non-2xx statuses and undecodable bodies are
//! normalized into a single [`RequestError`]. The actual I/O sits behind the
//! [`Transport`] trait so panel handlers can be exercised without a server.

mod ureq_transport;

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

pub use ureq_transport::UreqTransport;

/// Header injected into every request unless the caller overrides it.
const JSON_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The single error kind surfaced to panel handlers.
///
/// `Display` yields only the human-readable message so handlers can render
/// `Error: <message>` without further unwrapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The request never produced a response.
    #[error("{0}")]
    Network(String),
    /// The response was successful but its body was not JSON.
    #[error("{0}")]
    Decode(String),
}

impl RequestError {
    /// Build a status error, falling back to a generic message when the
    /// response body is empty.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("Request failed with status {status}")
        } else {
            body.to_string()
        };
        Self::Status { status, message }
    }

    /// HTTP status code, when the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// HTTP methods used by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied options merged over the helper's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    /// Extra headers. A header with the same (case-insensitive) name as a
    /// default replaces it.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options for a request carrying a JSON body.
    pub fn with_json(method: Method, body: &Value) -> Self {
        Self {
            method,
            body: Some(body.to_string()),
            headers: Vec::new(),
        }
    }
}

/// A fully resolved request handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body text of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange.
///
/// Implementations return `Ok` for every response the server produced,
/// including error statuses, and `Err(RequestError::Network)` only when no
/// response was received.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, RequestError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, RequestError> {
        (**self).send(request)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// JSON API client bound to a backend base URL.
#[derive(Debug)]
pub struct ApiClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a request to `path` (relative to the base URL) and decode the
    /// JSON response body.
    pub fn fetch_json(&self, path: &str, options: RequestOptions) -> Result<Value, RequestError> {
        let request = self.build_request(path, options);
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.send(&request).inspect_err(|e| {
            warn!(url = %request.url, error = %e, "request failed before a response");
        })?;

        if !response.is_success() {
            warn!(url = %request.url, status = response.status, "request returned error status");
            return Err(RequestError::from_status(response.status, &response.body));
        }

        debug!(url = %request.url, status = response.status, "response received");
        serde_json::from_str(&response.body)
            .map_err(|e| RequestError::Decode(format!("invalid JSON response: {e}")))
    }

    fn build_request(&self, path: &str, options: RequestOptions) -> ApiRequest {
        let mut headers = vec![(
            JSON_CONTENT_TYPE.0.to_string(),
            JSON_CONTENT_TYPE.1.to_string(),
        )];
        for (name, value) in options.headers {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        ApiRequest {
            method: options.method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body: options.body,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Canned {
        response: Result<RawResponse, RequestError>,
        seen: RefCell<Vec<ApiRequest>>,
    }

    impl Canned {
        fn status(status: u16, body: &str) -> Self {
            Self {
                response: Ok(RawResponse {
                    status,
                    body: body.to_string(),
                }),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn send(&self, request: &ApiRequest) -> Result<RawResponse, RequestError> {
            self.seen.borrow_mut().push(request.clone());
            self.response.clone()
        }
    }

    #[test]
    fn not_found_uses_body_as_message() {
        let client = ApiClient::new("", Canned::status(404, "not found"));
        let err = client.fetch_json("/x", RequestOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn empty_error_body_mentions_status() {
        let client = ApiClient::new("", Canned::status(503, ""));
        let err = client.fetch_json("/x", RequestOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 503");
    }

    #[test]
    fn success_parses_json() {
        let client = ApiClient::new("http://api/", Canned::status(200, r#"{"a":1}"#));
        let value = client.fetch_json("/metrics/cpu", RequestOptions::default()).unwrap();
        assert_eq!(value["a"], 1);
        let seen = client.transport().seen.borrow();
        assert_eq!(seen[0].url, "http://api/metrics/cpu");
        assert_eq!(seen[0].method, Method::Get);
    }

    #[test]
    fn non_json_success_is_decode_error() {
        let client = ApiClient::new("", Canned::status(200, "<html>"));
        let err = client.fetch_json("/x", RequestOptions::default()).unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[test]
    fn network_failure_passes_message_through() {
        let transport = Canned {
            response: Err(RequestError::Network("connection refused".to_string())),
            seen: RefCell::new(Vec::new()),
        };
        let client = ApiClient::new("", transport);
        let err = client.fetch_json("/x", RequestOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn json_content_type_is_always_sent() {
        let client = ApiClient::new("", Canned::status(200, "[]"));
        client.fetch_json("/x", RequestOptions::default()).unwrap();
        let seen = client.transport().seen.borrow();
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
    }

    #[test]
    fn caller_headers_override_defaults() {
        let client = ApiClient::new("", Canned::status(200, "[]"));
        let options = RequestOptions {
            headers: vec![
                ("content-type".to_string(), "text/plain".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ],
            ..RequestOptions::default()
        };
        client.fetch_json("/x", options).unwrap();
        let seen = client.transport().seen.borrow();
        assert_eq!(seen[0].header("Content-Type"), Some("text/plain"));
        assert_eq!(seen[0].header("x-trace"), Some("1"));
        assert_eq!(seen[0].headers.len(), 2);
    }
}
