//! Error types for the archive module.
//!
//! Every variant carries the URL that failed so a run aborting on a single
//! item still points at the exact request responsible.

use thiserror::Error;

/// Errors that can occur while talking to the remote archive API.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, broken body stream).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out at the transport layer.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response (4xx, 5xx).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response body was not the JSON we expected.
    #[error("invalid JSON from {url}: {message}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// Decoder message.
        message: String,
    },

    /// The configured base URL cannot carry path segments.
    #[error("invalid base URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ArchiveError {
    /// Creates a network error, promoting reqwest timeouts to [`ArchiveError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// No `From<reqwest::Error>`: every variant needs the URL, which reqwest errors
// do not reliably carry. Use the constructors above.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_error_http_status_display() {
        let error = ArchiveError::http_status("https://archive.test/api/v1/image/abc", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://archive.test/api/v1/image/abc"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_archive_error_timeout_display() {
        let error = ArchiveError::timeout("https://archive.test/api/v1/image");
        assert!(error.to_string().starts_with("timeout"));
    }

    #[test]
    fn test_archive_error_decode_display() {
        let error = ArchiveError::decode("https://archive.test/api/v1/image", "expected value");
        let msg = error.to_string();
        assert!(msg.contains("invalid JSON"), "Expected 'invalid JSON' in: {msg}");
        assert!(msg.contains("expected value"), "Expected decoder message in: {msg}");
    }

    #[test]
    fn test_archive_error_invalid_url_display() {
        let error = ArchiveError::invalid_url("mailto:someone@example.com");
        assert!(error.to_string().contains("mailto:someone@example.com"));
    }
}
