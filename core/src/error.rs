//! Error types for the workflow-engine client.
//!
//! # Design
//! One `ClientError` value describes exactly one failure kind. Transport
//! failures are surfaced verbatim; non-2xx responses become `ApiError`,
//! which keeps the failed response (status, headers and raw body) next to
//! the server's decoded `statusCode` / `errorMessage` fields.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpMethod;

/// Errors returned by every `Client` operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Username, password or base URL missing at construction.
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// Argument check failed before any request was built.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request payload: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The HTTP round trip itself failed; no response exists.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status outside 200..=299.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success body did not match the expected JSON shape.
    #[error("failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    /// A success body could not be read or copied into a raw sink.
    #[error("failed to read response body: {0}")]
    Body(#[source] std::io::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure of the underlying HTTP execution (connect, DNS, TLS, timeout).
#[derive(Debug, Error)]
#[error("transport error: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self { source: source.into() }
    }
}

impl From<ureq::Error> for TransportError {
    fn from(e: ureq::Error) -> Self {
        Self::new(e)
    }
}

/// A non-2xx response together with the server's error body.
///
/// `status` is the HTTP status line; `status_code` and `error_message` come
/// from the JSON body and stay empty when that body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub status_code: Option<String>,
    pub error_message: String,
}

/// Wire shape of the engine's error response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    status_code: Option<serde_json::Value>,
    #[serde(default)]
    error_message: Option<String>,
}

impl ApiError {
    /// Build the error from a drained error response. Decoding the body is
    /// best effort: an unparsable body leaves the decoded fields empty.
    pub fn from_response(
        method: HttpMethod,
        url: impl Into<String>,
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        let decoded = if body.is_empty() {
            ErrorBody::default()
        } else {
            serde_json::from_slice::<ErrorBody>(&body).unwrap_or_default()
        };
        let status_code = decoded.status_code.and_then(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Self {
            method,
            url: url.into(),
            status,
            headers,
            body,
            status_code,
            error_message: decoded.error_message.unwrap_or_default(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {} {}", self.method, self.url, self.status, self.error_message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, body: &str) -> ApiError {
        ApiError::from_response(
            HttpMethod::Get,
            "http://host/runtime/tasks/99",
            status,
            Vec::new(),
            body.as_bytes().to_vec(),
        )
    }

    #[test]
    fn decodes_string_status_code_and_message() {
        let err = api_error(404, r#"{"statusCode":"404","errorMessage":"not found"}"#);
        assert_eq!(err.status_code.as_deref(), Some("404"));
        assert_eq!(err.error_message, "not found");
    }

    #[test]
    fn decodes_numeric_status_code() {
        let err = api_error(409, r#"{"statusCode":409,"errorMessage":"Task already claimed"}"#);
        assert_eq!(err.status_code.as_deref(), Some("409"));
        assert_eq!(err.error_message, "Task already claimed");
    }

    #[test]
    fn undecodable_body_degrades_to_empty_message() {
        let err = api_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.status, 502);
        assert!(err.status_code.is_none());
        assert!(err.error_message.is_empty());
        assert_eq!(err.body, b"<html>Bad Gateway</html>");
    }

    #[test]
    fn display_combines_method_url_status_and_message() {
        let err = api_error(404, r#"{"statusCode":"404","errorMessage":"not found"}"#);
        assert_eq!(err.to_string(), "GET http://host/runtime/tasks/99: 404 not found");
    }

    #[test]
    fn client_error_wraps_api_error_transparently() {
        let err = ClientError::from(api_error(500, r#"{"errorMessage":"boom"}"#));
        assert_eq!(err.to_string(), "GET http://host/runtime/tasks/99: 500 boom");
    }

    #[test]
    fn transport_error_keeps_source_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = ClientError::from(TransportError::new(io));
        assert!(err.to_string().contains("connection refused"));
    }
}
