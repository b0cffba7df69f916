//! Client side of the remote image archive.
//!
//! The archive exposes three endpoints under one base URL:
//!
//! - `GET {base}/image?limit={L}&offset={O}` - a page of [`ItemRef`]s
//! - `GET {base}/image/{id}` - the item's metadata document (opaque JSON)
//! - `GET {base}/image/{id}/download` - the image bytes
//!
//! [`ImageArchive`] is the seam the mirror driver talks to; [`ArchiveClient`]
//! is its HTTP implementation.

mod client;
pub mod constants;
mod error;
mod item;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use serde_json::Value;

pub use client::ArchiveClient;
pub use constants::DEFAULT_BASE_URL;
pub use error::ArchiveError;
pub use item::ItemRef;

/// Body of a binary download, yielded chunk by chunk.
pub type BinaryStream = BoxStream<'static, Result<Bytes, ArchiveError>>;

/// Read access to an image archive.
///
/// Implementations must be shareable across tokio tasks; the driver holds one
/// behind an `Arc` and calls it from every item task of a batch.
#[async_trait]
pub trait ImageArchive: Send + Sync {
    /// Fetches one listing page. An empty vector means the collection is exhausted.
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<ItemRef>, ArchiveError>;

    /// Fetches the metadata document for `id`, verbatim.
    async fn fetch_metadata(&self, id: &str) -> Result<Value, ArchiveError>;

    /// Opens the binary download for `id`.
    async fn fetch_binary(&self, id: &str) -> Result<BinaryStream, ArchiveError>;
}
