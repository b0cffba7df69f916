//! Paginated batch driver.
//!
//! [`Mirror::run`] walks the archive listing page by page. Each page becomes a
//! batch: one tokio task per item, gated by a semaphore, all spawned before
//! any is joined. After the batch resolves the driver sleeps the throttle
//! interval and requests the next offset. An empty page ends the run.
//!
//! # Example
//!
//! ```no_run
//! use archive_mirror::{Mirror, MirrorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MirrorConfig::new("https://isic-archive.com/api/v1", "./data");
//! let mirror = Mirror::from_config(config)?;
//! let summary = mirror.run().await?;
//! println!("mirrored {} items over {} pages", summary.items_completed, summary.pages);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::error::{ItemError, ItemFailure, MirrorError};
use super::store::ArtifactStore;
use crate::archive::{ArchiveClient, ImageArchive, ItemRef};
use crate::config::{FailurePolicy, MirrorConfig};

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Non-empty listing pages processed.
    pub pages: usize,
    /// Items whose metadata and binary were both written.
    pub items_completed: usize,
    /// Items that failed (only non-zero under [`FailurePolicy::Continue`]).
    pub items_failed: usize,
}

/// Outcome of every item task in one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Items that finished successfully.
    pub completed: usize,
    /// Items that failed, in completion order.
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    /// Returns true if no item failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Mirrors an archive into an output directory.
pub struct Mirror {
    archive: Arc<dyn ImageArchive>,
    store: Arc<ArtifactStore>,
    config: MirrorConfig,
    semaphore: Arc<Semaphore>,
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Mirror {
    /// Creates a mirror reading from `archive`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] if the configuration is out of range.
    pub fn new(archive: Arc<dyn ImageArchive>, config: MirrorConfig) -> Result<Self, MirrorError> {
        config.validate()?;

        debug!(
            page_size = config.page_size,
            concurrency = config.concurrency,
            throttle_ms = config.throttle.as_millis(),
            policy = ?config.failure_policy,
            output_dir = %config.output_dir.display(),
            "creating mirror"
        );

        Ok(Self {
            archive,
            store: Arc::new(ArtifactStore::new(config.output_dir.clone())),
            semaphore: Arc::new(Semaphore::new(config.concurrency)),
            config,
        })
    }

    /// Creates a mirror backed by an [`ArchiveClient`] for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Client`] if the base URL is invalid or the HTTP
    /// client cannot be built, and [`MirrorError::Config`] for range errors.
    pub fn from_config(config: MirrorConfig) -> Result<Self, MirrorError> {
        let client = ArchiveClient::with_timeouts(
            &config.base_url,
            config.connect_timeout,
            config.read_timeout,
        )
        .map_err(MirrorError::Client)?;
        Self::new(Arc::new(client), config)
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Runs the mirror from offset 0 until the listing returns an empty page.
    ///
    /// # Errors
    ///
    /// - [`MirrorError::OutputDir`] if the output directory cannot be created
    /// - [`MirrorError::Listing`] if a listing request fails
    /// - [`MirrorError::Item`] on the first failed item under [`FailurePolicy::FailFast`]
    /// - [`MirrorError::Batch`] after a batch with failures under [`FailurePolicy::CollectAll`]
    ///
    /// Artifacts written before the failure stay on disk.
    #[instrument(skip(self), fields(output_dir = %self.config.output_dir.display()))]
    pub async fn run(&self) -> Result<MirrorSummary, MirrorError> {
        self.store
            .ensure_output_dir()
            .await
            .map_err(MirrorError::OutputDir)?;

        let page_size = self.config.page_size;
        let mut summary = MirrorSummary::default();
        let mut offset = 0usize;

        info!(base_url = %self.config.base_url, page_size, "starting mirror");

        loop {
            let page = self
                .archive
                .fetch_page(offset, page_size)
                .await
                .map_err(|source| MirrorError::Listing { offset, source })?;

            if page.is_empty() {
                debug!(offset, "empty page, collection exhausted");
                break;
            }

            info!(offset, items = page.len(), "processing page");
            summary.pages += 1;

            let report = self.run_batch(page).await?;
            summary.items_completed += report.completed;
            summary.items_failed += report.failures.len();

            if !report.is_success() {
                match self.config.failure_policy {
                    FailurePolicy::Continue => {
                        for failure in &report.failures {
                            warn!(id = %failure.id, error = %failure.error, "item failed, continuing");
                        }
                    }
                    // Fail-fast batches already error out in run_batch.
                    FailurePolicy::CollectAll | FailurePolicy::FailFast => {
                        return Err(MirrorError::Batch {
                            offset,
                            failures: report.failures,
                        });
                    }
                }
            }

            if self
                .config
                .max_pages
                .is_some_and(|max_pages| summary.pages >= max_pages)
            {
                info!(pages = summary.pages, "page limit reached");
                break;
            }

            if !self.config.throttle.is_zero() {
                debug!(
                    throttle_ms = self.config.throttle.as_millis(),
                    "throttling before next page"
                );
                tokio::time::sleep(self.config.throttle).await;
            }

            offset += page_size;
        }

        info!(
            pages = summary.pages,
            completed = summary.items_completed,
            failed = summary.items_failed,
            "mirror complete"
        );
        Ok(summary)
    }

    /// Downloads one page's items concurrently and joins them.
    ///
    /// Every task is spawned before the first join. Under
    /// [`FailurePolicy::FailFast`] the first failure is returned as an error
    /// and the remaining tasks are aborted; otherwise all tasks settle and
    /// their outcomes are collected in the report.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Item`] under [`FailurePolicy::FailFast`].
    #[instrument(skip(self, page), fields(items = page.len()))]
    pub async fn run_batch(&self, page: Vec<ItemRef>) -> Result<BatchReport, MirrorError> {
        let mut tasks = JoinSet::new();

        for item in page {
            let archive = Arc::clone(&self.archive);
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&self.semaphore);

            tasks.spawn(async move {
                // Permit is held until the item finishes.
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => download_item(archive.as_ref(), &store, &item).await,
                    Err(_) => Err(ItemError::Join("semaphore closed".to_string())),
                };
                (item.id, outcome)
            });
        }

        debug!(task_count = tasks.len(), "waiting for batch to settle");

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            let (id, outcome) = joined.unwrap_or_else(|join_error| {
                // A panicked task loses its identifier along with its state.
                (
                    String::from("<unknown>"),
                    Err(ItemError::Join(join_error.to_string())),
                )
            });

            match outcome {
                Ok(()) => report.completed += 1,
                Err(error) => {
                    let failure = ItemFailure { id, error };
                    if self.config.failure_policy == FailurePolicy::FailFast {
                        warn!(id = %failure.id, error = %failure.error, "item failed, aborting batch");
                        tasks.abort_all();
                        return Err(failure.into());
                    }
                    report.failures.push(failure);
                }
            }
        }

        Ok(report)
    }

    /// Downloads a single item's metadata and binary into the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Item`] if either download or write fails.
    pub async fn download_item(&self, item: &ItemRef) -> Result<(), MirrorError> {
        download_item(self.archive.as_ref(), &self.store, item)
            .await
            .map_err(|source| MirrorError::Item {
                id: item.id.clone(),
                source,
            })
    }
}

/// Metadata first, then the binary. The binary is not requested if the
/// metadata step fails.
#[instrument(skip(archive, store, item), fields(id = %item.id))]
async fn download_item(
    archive: &dyn ImageArchive,
    store: &ArtifactStore,
    item: &ItemRef,
) -> Result<(), ItemError> {
    info!(id = %item.id, name = item.name.as_deref().unwrap_or(""), "downloading image");

    // Reject unusable identifiers before any request is made.
    store.metadata_path(&item.id)?;

    let metadata = archive.fetch_metadata(&item.id).await?;
    store.write_metadata(&item.id, &metadata).await?;

    let body = archive.fetch_binary(&item.id).await?;
    let bytes = store.write_binary(&item.id, body).await?;

    debug!(id = %item.id, bytes, "item complete");
    Ok(())
}
