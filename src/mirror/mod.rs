//! Mirror driver and on-disk artifact store.
//!
//! The driver pages through an [`ImageArchive`](crate::archive::ImageArchive),
//! downloads every listed item and persists it as an artifact pair:
//!
//! - `{output_dir}/{id}.json` - metadata, pretty-printed with two-space indent
//! - `{output_dir}/{id}.jpg` - image bytes, streamed to disk
//!
//! Artifact writes are not atomic: metadata lands first, the binary second,
//! and a failure in between leaves the metadata alone on disk.

mod engine;
mod error;
mod store;

pub use engine::{BatchReport, Mirror, MirrorSummary};
pub use error::{ItemError, ItemFailure, MirrorError, StoreError};
pub use store::ArtifactStore;
