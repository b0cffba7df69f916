//! Archive Mirror Library
//!
//! This library mirrors a remote image archive to local disk. It pages through
//! the archive's listing endpoint and, for every listed item, stores the JSON
//! metadata document and the image file side by side, pausing between pages
//! to stay under the archive's rate limits.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`archive`] - HTTP client for the listing, metadata and download endpoints
//! - [`config`] - Run configuration (page size, throttle, concurrency, failure policy)
//! - [`mirror`] - Paginated batch driver and artifact store

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod mirror;
mod user_agent;

// Re-export commonly used types
pub use archive::{ArchiveClient, ArchiveError, BinaryStream, ImageArchive, ItemRef};
pub use config::{
    ConfigError, DEFAULT_PAGE_SIZE, DEFAULT_THROTTLE, FailurePolicy, MAX_PAGE_SIZE, MirrorConfig,
};
pub use mirror::{
    ArtifactStore, BatchReport, ItemError, ItemFailure, Mirror, MirrorError, MirrorSummary,
    StoreError,
};
