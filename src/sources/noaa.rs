//! HTTP access to the NOAA GHCN-Daily file layout.

use crate::sources::error::FetchError;
use crate::sources::{ArchiveSource, MetadataSource};
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn/daily/all";
pub const DEFAULT_STATIONS_URL: &str =
    "https://www.ncei.noaa.gov/pub/data/ghcn/daily/ghcnd-stations.txt";
pub const DEFAULT_INVENTORY_URL: &str =
    "https://www.ncei.noaa.gov/pub/data/ghcn/daily/ghcnd-inventory.txt";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads GHCN-Daily resources over HTTP.
///
/// A single client is shared by all requests. Every request is bounded by
/// `timeout`; a timed out request surfaces as [`FetchError::NetworkRequest`].
#[derive(Debug, Clone)]
pub struct NoaaClient {
    client: Client,
    archive_base_url: String,
    stations_url: String,
    inventory_url: String,
    timeout: Duration,
}

impl Default for NoaaClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_ARCHIVE_BASE_URL,
            DEFAULT_STATIONS_URL,
            DEFAULT_INVENTORY_URL,
            DEFAULT_FETCH_TIMEOUT,
        )
    }
}

impl NoaaClient {
    pub fn new(
        archive_base_url: impl Into<String>,
        stations_url: impl Into<String>,
        inventory_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            archive_base_url: archive_base_url.into(),
            stations_url: stations_url.into(),
            inventory_url: inventory_url.into(),
            timeout,
        }
    }

    fn archive_url(&self, station_id: &str) -> String {
        format!(
            "{}/{}.dly",
            self.archive_base_url.trim_end_matches('/'),
            station_id
        )
    }

    /// Downloads `url` completely and decodes it as UTF-8.
    async fn download_text(&self, url: &str) -> Result<String, FetchError> {
        info!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(match e.status() {
                    Some(StatusCode::NOT_FOUND) => FetchError::NotFound(url.to_string()),
                    Some(status) => FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => FetchError::NetworkRequest(url.to_string(), e),
                });
            }
        };

        let stream = response.bytes_stream().map_err(io::Error::other);
        let mut reader = StreamReader::new(stream);
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .await
            .map_err(|e| FetchError::DownloadIo(url.to_string(), e))?;
        info!("Downloaded {} bytes from {}", body.len(), url);

        String::from_utf8(body).map_err(|e| FetchError::Encoding(url.to_string(), e))
    }
}

impl ArchiveSource for NoaaClient {
    async fn fetch_archive(&self, station_id: &str) -> Result<String, FetchError> {
        let url = self.archive_url(station_id);
        self.download_text(&url).await
    }
}

impl MetadataSource for NoaaClient {
    async fn fetch_station_list(&self) -> Result<String, FetchError> {
        self.download_text(&self.stations_url).await
    }

    async fn fetch_inventory(&self) -> Result<String, FetchError> {
        self.download_text(&self.inventory_url).await
    }
}
