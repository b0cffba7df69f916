//! HTTP client for the archive's REST API.
//!
//! [`ArchiveClient`] wraps a pooled `reqwest::Client` and knows the three
//! endpoints the mirror needs: the paged listing, per-item metadata and the
//! per-item binary download.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{
    CONNECT_TIMEOUT_SECS, DOWNLOAD_SEGMENT, IMAGE_SEGMENT, READ_TIMEOUT_SECS,
};
use super::error::ArchiveError;
use super::item::ItemRef;
use super::{BinaryStream, ImageArchive};
use crate::user_agent;

/// HTTP client for one archive base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    base: Url,
}

impl ArchiveClient {
    /// Creates a client with default timeouts (30s connect, 5min read).
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidUrl`] if `base_url` does not parse or
    /// cannot carry path segments, and [`ArchiveError::ClientBuild`] if the
    /// HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ArchiveError> {
        Self::with_timeouts(
            base_url,
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            Duration::from_secs(READ_TIMEOUT_SECS),
        )
    }

    /// Creates a client with explicit connect and read timeouts.
    ///
    /// # Errors
    ///
    /// Same as [`ArchiveClient::new`].
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, ArchiveError> {
        let base = Url::parse(base_url).map_err(|_| ArchiveError::invalid_url(base_url))?;
        if base.cannot_be_a_base() {
            return Err(ArchiveError::invalid_url(base_url));
        }

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(ArchiveError::ClientBuild)?;

        Ok(Self { client, base })
    }

    /// Returns the base URL all endpoints are built from.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/image?limit={limit}&offset={offset}`
    fn listing_url(&self, offset: usize, limit: usize) -> Result<Url, ArchiveError> {
        let mut url = self.endpoint(&[IMAGE_SEGMENT])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }

    /// `{base}/image/{id}`
    fn metadata_url(&self, id: &str) -> Result<Url, ArchiveError> {
        self.endpoint(&[IMAGE_SEGMENT, id])
    }

    /// `{base}/image/{id}/download`
    fn binary_url(&self, id: &str) -> Result<Url, ArchiveError> {
        self.endpoint(&[IMAGE_SEGMENT, id, DOWNLOAD_SEGMENT])
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ArchiveError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ArchiveError::invalid_url(self.base.as_str()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a GET and rejects non-success statuses.
    async fn get(&self, url: &Url) -> Result<reqwest::Response, ArchiveError> {
        debug!(url = %url, "sending request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ArchiveError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::http_status(url.as_str(), status.as_u16()));
        }
        Ok(response)
    }

    /// Reads the full body and decodes it as JSON.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<T, ArchiveError> {
        let body = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| ArchiveError::network(url.as_str(), e))?;
        serde_json::from_slice(&body).map_err(|e| ArchiveError::decode(url.as_str(), e.to_string()))
    }
}

#[async_trait]
impl ImageArchive for ArchiveClient {
    #[instrument(skip(self))]
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<ItemRef>, ArchiveError> {
        let url = self.listing_url(offset, limit)?;
        // A `null` body is treated like an empty page.
        let page: Option<Vec<ItemRef>> = self.get_json(&url).await?;
        let page = page.unwrap_or_default();
        debug!(items = page.len(), "listing page received");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn fetch_metadata(&self, id: &str) -> Result<Value, ArchiveError> {
        let url = self.metadata_url(id)?;
        self.get_json(&url).await
    }

    #[instrument(skip(self))]
    async fn fetch_binary(&self, id: &str) -> Result<BinaryStream, ArchiveError> {
        let url = self.binary_url(id)?;
        let response = self.get(&url).await?;
        let url = url.to_string();
        Ok(response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| ArchiveError::network(url.clone(), e)))
            .boxed())
    }
}
