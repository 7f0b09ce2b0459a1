//! Settings of a [`StationExplorer`](crate::StationExplorer).

use crate::sources::noaa::{
    DEFAULT_ARCHIVE_BASE_URL, DEFAULT_FETCH_TIMEOUT, DEFAULT_INVENTORY_URL, DEFAULT_STATIONS_URL,
};
use crate::weather_data::cache::DEFAULT_CACHE_CAPACITY;
use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration of the data directory, the station cache and the NOAA endpoints.
///
/// Every field has a default, so `ExplorerConfig::builder().build()` is a
/// valid configuration.
///
/// # Examples
///
/// ```
/// use ghcnd_explorer::ExplorerConfig;
/// use std::time::Duration;
///
/// let config = ExplorerConfig::builder()
///     .data_dir("/var/lib/ghcnd".into())
///     .cache_capacity(25)
///     .fetch_timeout(Duration::from_secs(120))
///     .build();
/// assert_eq!(config.cache_capacity, 25);
/// assert!(config.archive_base_url.starts_with("https://"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ExplorerConfig {
    /// Directory holding the station catalog and the cached station datasets.
    /// Defaults to `ghcnd_explorer` inside the platform cache directory.
    pub data_dir: Option<PathBuf>,
    /// Maximum number of stations whose datasets are kept on disk.
    #[builder(default = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,
    /// Upper bound on each network fetch made while building a station.
    #[builder(default = DEFAULT_FETCH_TIMEOUT)]
    pub fetch_timeout: Duration,
    #[builder(default = DEFAULT_ARCHIVE_BASE_URL.to_string(), into)]
    pub archive_base_url: String,
    #[builder(default = DEFAULT_STATIONS_URL.to_string(), into)]
    pub stations_url: String,
    #[builder(default = DEFAULT_INVENTORY_URL.to_string(), into)]
    pub inventory_url: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
