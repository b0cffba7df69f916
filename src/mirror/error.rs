//! Error types for the mirror driver and artifact store.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::config::ConfigError;

/// Errors writing artifacts to the output directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identifier cannot be used as a file stem (empty, `.`/`..`, contains a separator).
    #[error("invalid item identifier {id:?}")]
    InvalidIdentifier {
        /// The rejected identifier.
        id: String,
    },

    /// Metadata could not be serialized.
    #[error("failed to serialize metadata for {id}: {source}")]
    Serialize {
        /// Item identifier.
        id: String,
        /// The underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem error (create directory, create file, write).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The binary body failed mid-transfer.
    #[error("download stream failed while writing {path}: {source}")]
    Stream {
        /// The partially written file.
        path: PathBuf,
        /// The error reported by the body stream.
        #[source]
        source: ArchiveError,
    },
}

impl StoreError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a serialization error.
    pub fn serialize(id: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialize {
            id: id.into(),
            source,
        }
    }

    /// Creates a stream error.
    pub fn stream(path: impl Into<PathBuf>, source: ArchiveError) -> Self {
        Self::Stream {
            path: path.into(),
            source,
        }
    }
}

/// Why a single item task failed.
#[derive(Debug, Error)]
pub enum ItemError {
    /// Metadata or binary request failed.
    #[error(transparent)]
    Fetch(#[from] ArchiveError),

    /// Writing an artifact failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The item task panicked or was cancelled.
    #[error("item task did not complete: {0}")]
    Join(String),
}

/// One failed item of a batch.
#[derive(Debug)]
pub struct ItemFailure {
    /// Identifier of the failed item.
    pub id: String,
    /// The failure.
    pub error: ItemError,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.error)
    }
}

/// Errors that end a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Configuration values out of range.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The archive client could not be set up.
    #[error("archive client setup failed: {0}")]
    Client(#[source] ArchiveError),

    /// The output directory could not be prepared.
    #[error("output directory unavailable: {0}")]
    OutputDir(#[source] StoreError),

    /// A listing request failed.
    #[error("listing failed at offset {offset}: {source}")]
    Listing {
        /// Offset of the failed page.
        offset: usize,
        /// The underlying archive error.
        #[source]
        source: ArchiveError,
    },

    /// An item task failed under the fail-fast policy.
    #[error("item {id} failed: {source}")]
    Item {
        /// Identifier of the failed item.
        id: String,
        /// The underlying item error.
        #[source]
        source: ItemError,
    },

    /// One or more items of a batch failed under the collect-all policy.
    #[error("{} item(s) failed in batch at offset {offset}", .failures.len())]
    Batch {
        /// Offset of the batch.
        offset: usize,
        /// Every failed item of the batch.
        failures: Vec<ItemFailure>,
    },
}

impl From<ItemFailure> for MirrorError {
    fn from(failure: ItemFailure) -> Self {
        Self::Item {
            id: failure.id,
            source: failure.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = StoreError::io(PathBuf::from("/data/abc.json"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/data/abc.json"), "Expected path in: {msg}");
    }

    #[test]
    fn test_item_failure_converts_to_mirror_error() {
        let failure = ItemFailure {
            id: "abc123".to_string(),
            error: ItemError::Fetch(ArchiveError::http_status("https://a.test/image/abc123", 500)),
        };
        let error = MirrorError::from(failure);
        let msg = error.to_string();
        assert!(msg.contains("abc123"), "Expected id in: {msg}");
        assert!(msg.contains("500"), "Expected status in: {msg}");
    }

    #[test]
    fn test_batch_error_counts_failures() {
        let failures = vec![
            ItemFailure {
                id: "a".to_string(),
                error: ItemError::Join("cancelled".to_string()),
            },
            ItemFailure {
                id: "b".to_string(),
                error: ItemError::Join("cancelled".to_string()),
            },
        ];
        let error = MirrorError::Batch {
            offset: 40,
            failures,
        };
        assert_eq!(error.to_string(), "2 item(s) failed in batch at offset 40");
    }
}
