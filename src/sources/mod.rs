//! Upstream data sources: the station metadata repository and the
//! per-station observation archive.

pub mod error;
pub mod noaa;

use crate::sources::error::FetchError;
use std::future::Future;

/// Provides the raw fixed-width archive text of a single station.
pub trait ArchiveSource: Send + Sync {
    fn fetch_archive(
        &self,
        station_id: &str,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Provides the two metadata resources the station catalog is built from.
pub trait MetadataSource: Send + Sync {
    /// The fixed-width station list (`ghcnd-stations.txt` layout).
    fn fetch_station_list(&self) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// The whitespace-delimited element inventory (`ghcnd-inventory.txt` layout).
    fn fetch_inventory(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}
