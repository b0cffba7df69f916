//! Constants for the archive module (endpoint defaults, timeouts).

/// Public API root of the ISIC image archive.
pub const DEFAULT_BASE_URL: &str = "https://isic-archive.com/api/v1";

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large images).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Path segment of the image collection, shared by all three endpoints.
pub(crate) const IMAGE_SEGMENT: &str = "image";

/// Trailing segment of the binary download endpoint.
pub(crate) const DOWNLOAD_SEGMENT: &str = "download";
