//! The main entry point: station search, on-demand station datasets and
//! seasonal summaries over a shared catalog and cache.

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::sources::noaa::NoaaClient;
use crate::sources::{ArchiveSource, MetadataSource};
use crate::stations::catalog::StationCatalog;
use crate::types::aggregates::SeasonalRow;
use crate::types::station::Station;
use crate::types::year_span::YearSpan;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use crate::weather_data::cache::StationCache;
use crate::weather_data::datasets::StationDatasets;
use bon::bon;
use log::error;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use ghcnd_explorer::LatLon;
///
/// let nuernberg = LatLon(49.503, 11.055);
/// assert_eq!(nuernberg.0, 49.503); // Latitude
/// assert_eq!(nuernberg.1, 11.055); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon(pub f64, pub f64);

/// Search center used when none is given.
pub const DEFAULT_LOCATION: LatLon = LatLon(48.0458, 8.4617);
pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const MAX_RADIUS_KM: f64 = 100.0;
pub const DEFAULT_STATION_LIMIT: usize = 5;
pub const MAX_STATION_LIMIT: usize = 10;

/// Subdirectory of the data directory holding the per-station datasets.
const DATASETS_DIR_NAME: &str = "daily";

/// A search result: a station and its great-circle distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStation {
    pub station: Station,
    pub distance_km: f64,
}

/// Finds stations and serves their processed temperature data.
///
/// Construct one explorer per process and share it by reference. The catalog
/// is loaded once; station datasets are built on first request and then
/// served from the bounded on-disk cache.
///
/// # Examples
///
/// ```no_run
/// use ghcnd_explorer::{LatLon, StationExplorer, ExplorerError, YearSpan};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), ExplorerError> {
/// let explorer = StationExplorer::new().await?;
///
/// let nearby = explorer
///     .find_stations()
///     .location(LatLon(49.45, 11.08))
///     .years(YearSpan::new(1990, 2020))
///     .call();
///
/// if let Some(closest) = nearby.first() {
///     let rows = explorer
///         .seasonal_summary()
///         .station_id(&closest.station.id)
///         .years(YearSpan::new(1990, 2020))
///         .call()
///         .await?;
///     println!("{} seasonal rows for {}", rows.len(), closest.station.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct StationExplorer<A = NoaaClient> {
    catalog: StationCatalog,
    cache: StationCache<A>,
    data_dir: PathBuf,
}

impl StationExplorer<NoaaClient> {
    /// Creates an explorer with the default configuration, storing its data
    /// in the platform cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExplorerError::CacheDirResolution`] if there is no platform
    /// cache directory, [`ExplorerError::CacheDirCreation`] if it cannot be
    /// created and [`ExplorerError::CatalogUnavailable`] if the station
    /// catalog can neither be loaded nor built.
    pub async fn new() -> Result<Self, ExplorerError> {
        Self::with_config(ExplorerConfig::default()).await
    }

    /// Creates an explorer talking to NOAA with the given settings.
    pub async fn with_config(config: ExplorerConfig) -> Result<Self, ExplorerError> {
        let client = NoaaClient::new(
            config.archive_base_url.clone(),
            config.stations_url.clone(),
            config.inventory_url.clone(),
            config.fetch_timeout,
        );
        Self::with_source(config, client).await
    }
}

#[bon]
impl<A: ArchiveSource + MetadataSource> StationExplorer<A> {
    /// Creates an explorer reading metadata and archives from `source`.
    ///
    /// The endpoint URLs of `config` are ignored; everything else applies.
    pub async fn with_source(config: ExplorerConfig, source: A) -> Result<Self, ExplorerError> {
        let data_dir = match config.data_dir {
            Some(dir) => dir,
            None => get_cache_dir().map_err(ExplorerError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&data_dir)
            .await
            .map_err(|e| ExplorerError::CacheDirCreation(data_dir.clone(), e))?;

        let catalog = StationCatalog::open(&data_dir, &source).await.map_err(|e| {
            error!("Station catalog unavailable: {}", e);
            ExplorerError::CatalogUnavailable(e)
        })?;

        let cache = StationCache::new(
            source,
            data_dir.join(DATASETS_DIR_NAME),
            config.cache_capacity,
            config.fetch_timeout,
        );

        Ok(Self {
            catalog,
            cache,
            data_dir,
        })
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &StationCache<A> {
        &self.cache
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Finds stations near a location whose temperature coverage overlaps a year span.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: Optional. Search center, defaults to [`DEFAULT_LOCATION`].
    /// * `.max_distance_km(f64)`: Optional. Search radius, defaults to `50.0`
    ///   and is clamped to `1.0..=100.0`.
    /// * `.station_limit(usize)`: Optional. Number of results, defaults to `5`
    ///   and is clamped to `1..=10`.
    /// * `.years(YearSpan)`: Optional. Required coverage, defaults to [`YearSpan::default`].
    ///
    /// Results are sorted by distance, closest first. An empty result is not an error.
    #[builder]
    pub fn find_stations(
        &self,
        location: Option<LatLon>,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
        years: Option<YearSpan>,
    ) -> Vec<NearbyStation> {
        let location = location.unwrap_or(DEFAULT_LOCATION);
        let max_distance_km = max_distance_km
            .unwrap_or(DEFAULT_RADIUS_KM)
            .clamp(1.0, MAX_RADIUS_KM);
        let station_limit = station_limit
            .unwrap_or(DEFAULT_STATION_LIMIT)
            .clamp(1, MAX_STATION_LIMIT);
        let years = years.unwrap_or_default();

        self.catalog
            .nearest(location, max_distance_km, station_limit, years)
            .into_iter()
            .map(|(station, distance_km)| NearbyStation {
                station,
                distance_km,
            })
            .collect()
    }

    /// Looks up a catalog station by ID.
    pub fn station(&self, station_id: &str) -> Result<&Station, ExplorerError> {
        self.catalog
            .get(station_id)
            .ok_or_else(|| ExplorerError::UnknownStation(station_id.to_string()))
    }

    /// Returns the processed datasets of a catalog station, downloading and
    /// processing its archive if it is not cached.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::UnknownStation`] for IDs missing from the catalog,
    /// [`ExplorerError::StationData`] if the datasets cannot be produced. Use
    /// [`ExplorerError::user_message`] for the text shown to users.
    pub async fn station_data(&self, station_id: &str) -> Result<StationDatasets, ExplorerError> {
        let station = self.station(station_id)?;
        Ok(self.cache.get_or_build(&station.id).await?)
    }

    /// Seasonal min/max temperatures of a station per year of a span.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.station_id(&str)`: **Required.** A catalog station ID.
    /// * `.years(YearSpan)`: Optional. Years to summarize, defaults to [`YearSpan::default`].
    ///
    /// Monthly data outside the span is dropped before seasons are computed,
    /// so the first year's winter lacks the preceding December. Season labels
    /// follow the station's hemisphere.
    #[builder]
    pub async fn seasonal_summary(
        &self,
        station_id: &str,
        years: Option<YearSpan>,
    ) -> Result<Vec<SeasonalRow>, ExplorerError> {
        let hemisphere = self.station(station_id)?.hemisphere();
        let datasets = self.station_data(station_id).await?;
        Ok(datasets.seasonal(hemisphere, years.unwrap_or_default()))
    }
}
