//! Run configuration for the mirror driver.
//!
//! Every tunable the driver uses lives on [`MirrorConfig`], so tests can swap
//! in a mock base URL, a temp output directory and a zero throttle.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::archive::DEFAULT_BASE_URL;
use crate::archive::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Items requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page the archive's listing endpoint serves.
pub const MAX_PAGE_SIZE: usize = 50;

/// Pause between successful batches.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "data";

const MIN_CONCURRENCY: usize = 1;
const MAX_CONCURRENCY: usize = 100;

/// What the driver does when an item task in a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run on the first failed item; the rest of the batch is cancelled.
    #[default]
    FailFast,
    /// Let the whole batch settle, then abort reporting every failed item.
    CollectAll,
    /// Log failed items, count them and keep paginating.
    Continue,
}

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Page size outside `1..=MAX_PAGE_SIZE`.
    #[error("invalid page size {value}: must be between 1 and {MAX_PAGE_SIZE}")]
    InvalidPageSize {
        /// The rejected value.
        value: usize,
    },

    /// Concurrency outside `MIN_CONCURRENCY..=MAX_CONCURRENCY`.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// A page cap of zero would never fetch anything.
    #[error("max pages must be at least 1")]
    ZeroMaxPages,
}

/// Settings for one mirror run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// API root, e.g. `https://isic-archive.com/api/v1`.
    pub base_url: String,
    /// Directory receiving `{id}.json` and `{id}.jpg`.
    pub output_dir: PathBuf,
    /// Items per listing request; also the offset stride.
    pub page_size: usize,
    /// Sleep between batches.
    pub throttle: Duration,
    /// Maximum item tasks in flight at once.
    pub concurrency: usize,
    /// Reaction to failed item tasks.
    pub failure_policy: FailurePolicy,
    /// Stop after this many non-empty pages. `None` runs until an empty page.
    pub max_pages: Option<usize>,
    /// HTTP connect timeout.
    pub connect_timeout: Duration,
    /// HTTP whole-request timeout.
    pub read_timeout: Duration,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            page_size: DEFAULT_PAGE_SIZE,
            throttle: DEFAULT_THROTTLE,
            concurrency: DEFAULT_PAGE_SIZE,
            failure_policy: FailurePolicy::default(),
            max_pages: None,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

impl MirrorConfig {
    /// Default configuration pointed at `base_url` and writing into `output_dir`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the inter-batch throttle.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sets the concurrency limit.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Caps the number of non-empty pages processed.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::InvalidPageSize {
                value: self.page_size,
            });
        }
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        if self.max_pages == Some(0) {
            return Err(ConfigError::ZeroMaxPages);
        }
        Ok(())
    }
}
