//! Platform Abstraction Layer
//!
//! The content client talks to the network through the [`Transport`] trait so
//! that the interpreter, session and client are platform-agnostic:
//!
//! - Browser (via wasm-bindgen, web-sys): `web::FetchTransport`
//! - Native (tests, CLI): in-memory content or scripted transports
//!
//! Only the Transport implementation knows about the host environment.

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::HashMap;
use std::future::Future;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The request never produced a response (DNS, CORS, offline, ...)
    Network(String),
    /// Feature not supported on this platform
    NotSupported(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Network(s) => write!(f, "network error: {}", s),
            PlatformError::NotSupported(s) => write!(f, "Not supported: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// HTTP response
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are stored lowercased
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header (name is case-insensitive)
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport for GET requests against the content service.
///
/// Each platform provides one. Futures are not `Send`: the browser is
/// single-threaded and the native side drives them with `block_on`.
pub trait Transport {
    /// Issue a GET request and resolve with the full response.
    ///
    /// Non-2xx statuses are returned as responses, not errors; only a
    /// request that never produced a response is a `PlatformError`.
    fn get(&self, url: &str) -> impl Future<Output = PlatformResult<HttpResponse>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = HttpResponse::new(200, "[]").with_header("X-WP-Total", "12");
        assert_eq!(resp.header("x-wp-total"), Some("12"));
        assert_eq!(resp.header("X-WP-TOTAL"), Some("12"));
        assert_eq!(resp.header("x-wp-totalpages"), None);
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
