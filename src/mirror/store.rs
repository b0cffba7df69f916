//! On-disk layout of mirrored items.
//!
//! Each item identifier maps to exactly two files in the output directory:
//! `{id}.json` (pretty-printed metadata) and `{id}.jpg` (raw image bytes).
//! Both are overwritten on every write; nothing is ever read back.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::error::StoreError;
use crate::archive::BinaryStream;

const METADATA_EXTENSION: &str = "json";
const BINARY_EXTENSION: &str = "jpg";

/// Writes artifact pairs into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `output_dir`. Nothing touches disk yet.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory if it is missing.
    ///
    /// Only the last path component is created; a missing parent is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created or the
    /// path exists but is not a directory.
    pub async fn ensure_output_dir(&self) -> Result<(), StoreError> {
        if let Ok(metadata) = tokio::fs::metadata(&self.output_dir).await {
            if metadata.is_dir() {
                return Ok(());
            }
            return Err(StoreError::io(
                self.output_dir.clone(),
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }
        debug!(path = %self.output_dir.display(), "creating output directory");
        match tokio::fs::create_dir(&self.output_dir).await {
            Ok(()) => Ok(()),
            // Another process may have won the race.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(StoreError::io(self.output_dir.clone(), e)),
        }
    }

    /// Path of the metadata file for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] if `id` is not a plain file stem.
    pub fn metadata_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        self.artifact_path(id, METADATA_EXTENSION)
    }

    /// Path of the binary file for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] if `id` is not a plain file stem.
    pub fn binary_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        self.artifact_path(id, BINARY_EXTENSION)
    }

    fn artifact_path(&self, id: &str, extension: &str) -> Result<PathBuf, StoreError> {
        validate_identifier(id)?;
        Ok(self.output_dir.join(format!("{id}.{extension}")))
    }

    /// Writes `metadata` to `{id}.json` with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`], [`StoreError::Serialize`] or
    /// [`StoreError::Io`].
    #[instrument(skip(self, metadata))]
    pub async fn write_metadata(&self, id: &str, metadata: &Value) -> Result<PathBuf, StoreError> {
        let path = self.metadata_path(id)?;
        // serde_json's pretty printer indents with two spaces.
        let body = serde_json::to_vec_pretty(metadata).map_err(|e| StoreError::serialize(id, e))?;
        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| StoreError::io(path.clone(), e))?;
        debug!(path = %path.display(), bytes = body.len(), "metadata written");
        Ok(path)
    }

    /// Streams `body` into `{id}.jpg`, returning the number of bytes written.
    ///
    /// Chunks are written as they arrive; the payload is never held in memory
    /// as a whole. A stream error leaves the partially written file in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Stream`] if the body fails mid-transfer, and
    /// [`StoreError::InvalidIdentifier`] or [`StoreError::Io`] otherwise.
    #[instrument(skip(self, body))]
    pub async fn write_binary(&self, id: &str, mut body: BinaryStream) -> Result<u64, StoreError> {
        let path = self.binary_path(id)?;
        let file = File::create(&path)
            .await
            .map_err(|e| StoreError::io(path.clone(), e))?;
        let mut writer = BufWriter::new(file);
        let mut bytes_written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| StoreError::stream(path.clone(), e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| StoreError::io(path.clone(), e))?;
            bytes_written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| StoreError::io(path.clone(), e))?;

        debug!(path = %path.display(), bytes = bytes_written, "binary written");
        Ok(bytes_written)
    }
}

/// Rejects identifiers that would escape the output directory or name no file.
fn validate_identifier(id: &str) -> Result<(), StoreError> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidIdentifier { id: id.to_string() });
    }
    Ok(())
}
