//! Request and response value types
//!
//! Minimal HTTP-shaped types for intercepted requests and cached responses.
//! A response with no body and status 404 is the defined outcome for an
//! uncached sub-resource; it is not an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a request was issued by the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    /// Script, image, data or any other sub-resource load
    Subresource,
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate => write!(f, "navigate"),
            Self::Subresource => write!(f, "subresource"),
        }
    }
}

/// An intercepted outbound request
#[derive(Debug, Clone)]
pub struct Request {
    /// Absolute URL path being requested
    pub url: String,
    /// Request mode
    pub mode: RequestMode,
}

impl Request {
    /// Create a top-level navigation request
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
        }
    }

    /// Create a sub-resource request
    pub fn subresource(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Subresource,
        }
    }

    /// Whether this request is a top-level navigation
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A response served back to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP-style status code
    pub status: u16,
    /// Response payload; `None` for the empty 404 body
    pub body: Option<Vec<u8>>,
    /// MIME type, when known
    pub content_type: Option<String>,
}

impl Response {
    /// Create a 200 response with a payload
    pub fn ok(body: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            status: 200,
            body: Some(body),
            content_type,
        }
    }

    /// Create the empty-body 404 response served for uncached sub-resources
    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: None,
            content_type: None,
        }
    }

    /// Whether the status is in the success range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Payload size in bytes (0 for an empty body)
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

/// Guess a MIME type from a URL path extension
///
/// Used by the directory fetcher, which has no upstream server to ask.
/// Unknown extensions return `None` and the entry is stored untyped.
pub fn guess_content_type(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?;
    match ext {
        "html" | "htm" => Some("text/html"),
        "js" => Some("text/javascript"),
        "css" => Some("text/css"),
        "json" => Some("application/json"),
        "wasm" => Some("application/wasm"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        "woff" => Some("font/woff"),
        "woff2" => Some("font/woff2"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_constructors() {
        let nav = Request::navigate("/app/settings");
        assert!(nav.is_navigation());

        let sub = Request::subresource("/app/bundle.js");
        assert!(!sub.is_navigation());
        assert_eq!(sub.url, "/app/bundle.js");
    }

    #[test]
    fn not_found_has_empty_body() {
        let res = Response::not_found();
        assert_eq!(res.status, 404);
        assert_eq!(res.body, None);
        assert_eq!(res.body_len(), 0);
        assert!(!res.is_success());
    }

    #[test]
    fn ok_response() {
        let res = Response::ok(b"<html>".to_vec(), Some("text/html".to_string()));
        assert!(res.is_success());
        assert_eq!(res.body_len(), 6);
    }

    #[test]
    fn content_type_guessing() {
        assert_eq!(guess_content_type("/app/index.html"), Some("text/html"));
        assert_eq!(guess_content_type("/app/game.wasm"), Some("application/wasm"));
        assert_eq!(guess_content_type("/app/icons/192.png"), Some("image/png"));
        assert_eq!(guess_content_type("/app/data.unknown"), None);
    }

    #[test]
    fn request_mode_serde() {
        let json = serde_json::to_string(&RequestMode::Navigate).unwrap();
        assert_eq!(json, "\"navigate\"");
    }
}
