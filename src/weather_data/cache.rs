//! Bounded on-disk cache of processed station datasets.
//!
//! Each cached station occupies three CSV files in the cache directory (see
//! [`DatasetPaths`]). A station counts as cached once its yearly file exists.
//! When a build would exceed the capacity, the station whose files were
//! created first is evicted. Reading a cached station does not change its
//! eviction order.

use crate::sources::ArchiveSource;
use crate::weather_data::aggregator::{monthly_averages, yearly_averages};
use crate::weather_data::cleaner::clean_observations;
use crate::weather_data::datasets::StationDatasets;
use crate::weather_data::error::StationDataError;
use crate::weather_data::parser::parse_archive;
use crate::weather_data::storage::{
    read_monthly, read_observations, read_yearly, write_monthly, write_observations, write_yearly,
    DatasetPaths, YEARLY_SUFFIX,
};
use log::{debug, error, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::{fs, task};

pub const DEFAULT_CACHE_CAPACITY: usize = 10;

pub struct StationCache<A> {
    source: A,
    dir: PathBuf,
    capacity: usize,
    fetch_timeout: Duration,
    // Held for the whole miss path, so a station is built at most once at a
    // time and concurrent builds cannot overshoot the capacity.
    build_lock: Mutex<()>,
}

impl<A: ArchiveSource> StationCache<A> {
    /// Creates a cache storing its files in `dir`. A capacity of zero is treated as one.
    pub fn new(
        source: A,
        dir: impl Into<PathBuf>,
        capacity: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            dir: dir.into(),
            capacity: capacity.max(1),
            fetch_timeout,
            build_lock: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self, station_id: &str) -> DatasetPaths {
        DatasetPaths::new(&self.dir, station_id)
    }

    /// Returns the datasets of `station_id`, building them on a cache miss.
    ///
    /// A hit requires all three files to exist; their content is never
    /// refreshed. On a miss the oldest station is evicted first if the cache
    /// is full, then the archive is downloaded and processed.
    ///
    /// # Errors
    ///
    /// Any failure of the build is returned as a [`StationDataError`]. In that
    /// case all files of `station_id` are removed, so a later call starts
    /// from scratch.
    pub async fn get_or_build(
        &self,
        station_id: &str,
    ) -> Result<StationDatasets, StationDataError> {
        let paths = self.paths(station_id);
        if paths.all_exist() {
            info!("Cache hit for station {}", station_id);
            return load_datasets(station_id, paths).await;
        }

        let _guard = self.build_lock.lock().await;
        if paths.all_exist() {
            info!("Station {} was built by a concurrent request", station_id);
            return load_datasets(station_id, paths).await;
        }

        warn!(
            "Cache miss for station {}. Downloading and processing.",
            station_id
        );
        match self.build(station_id, &paths).await {
            Ok(datasets) => {
                info!(
                    "Cached station {}: {} observations, {} months, {} years",
                    station_id,
                    datasets.observations.len(),
                    datasets.monthly.len(),
                    datasets.yearly.len()
                );
                Ok(datasets)
            }
            Err(e) => {
                error!("Building data for station {} failed: {}", station_id, e);
                if let Err(cleanup) = remove_files(&paths).await {
                    error!("Could not clean up station {}: {}", station_id, cleanup);
                }
                Err(e)
            }
        }
    }

    async fn build(
        &self,
        station_id: &str,
        paths: &DatasetPaths,
    ) -> Result<StationDatasets, StationDataError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StationDataError::CacheDirCreation(self.dir.clone(), e))?;

        if self.cached_stations().await?.len() >= self.capacity {
            self.evict_oldest().await?;
        }

        let raw = tokio::time::timeout(self.fetch_timeout, self.source.fetch_archive(station_id))
            .await
            .map_err(|_| StationDataError::Timeout {
                station: station_id.to_string(),
                timeout: self.fetch_timeout,
            })?
            .map_err(|source| StationDataError::ArchiveFetch {
                station: station_id.to_string(),
                source,
            })?;

        let station = station_id.to_string();
        let paths = paths.clone();
        task::spawn_blocking(move || process_archive(&station, &raw, paths)).await?
    }

    /// IDs of all stations with a yearly dataset, sorted.
    pub async fn cached_stations(&self) -> Result<Vec<String>, StationDataError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StationDataError::CacheList(self.dir.clone(), e)),
        };

        let mut stations = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StationDataError::CacheList(self.dir.clone(), e))?
        {
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(YEARLY_SUFFIX)) {
                stations.push(id.to_string());
            }
        }
        stations.sort();
        Ok(stations)
    }

    /// Deletes the files of the station whose existing files have the
    /// earliest creation time. Returns the evicted station, if any.
    pub async fn evict_oldest(&self) -> Result<Option<String>, StationDataError> {
        let mut oldest: Option<(SystemTime, String)> = None;
        for station in self.cached_stations().await? {
            let Some(created) = earliest_creation(&self.paths(&station)).await? else {
                continue;
            };
            let candidate = (created, station);
            if oldest.as_ref().map_or(true, |current| candidate < *current) {
                oldest = Some(candidate);
            }
        }

        let Some((_, station)) = oldest else {
            return Ok(None);
        };
        info!("Evicting station {} from the cache", station);
        remove_files(&self.paths(&station)).await?;
        Ok(Some(station))
    }
}

/// Parses, cleans and aggregates one archive, persisting each dataset as soon
/// as it is produced.
fn process_archive(
    station_id: &str,
    raw: &str,
    paths: DatasetPaths,
) -> Result<StationDatasets, StationDataError> {
    let parsed = parse_archive(raw, station_id)?;
    debug!("Parsed {} observations for station {}", parsed.len(), station_id);

    let observations = clean_observations(&parsed);
    if observations.is_empty() {
        return Err(StationDataError::EmptyDataset {
            station: station_id.to_string(),
            stage: "temperature",
        });
    }
    write_observations(&paths.observations, &observations)?;

    let monthly = monthly_averages(&observations);
    write_monthly(&paths.monthly, &monthly)?;

    let yearly = yearly_averages(&monthly);
    write_yearly(&paths.yearly, &yearly)?;

    Ok(StationDatasets {
        station_id: station_id.to_string(),
        observations,
        monthly,
        yearly,
        paths,
    })
}

async fn load_datasets(
    station_id: &str,
    paths: DatasetPaths,
) -> Result<StationDatasets, StationDataError> {
    let station_id = station_id.to_string();
    task::spawn_blocking(move || {
        Ok(StationDatasets {
            observations: read_observations(&paths.observations)?,
            monthly: read_monthly(&paths.monthly)?,
            yearly: read_yearly(&paths.yearly)?,
            station_id,
            paths,
        })
    })
    .await?
}

/// Earliest creation time among the files of a station that exist.
async fn earliest_creation(paths: &DatasetPaths) -> Result<Option<SystemTime>, StationDataError> {
    let mut earliest: Option<SystemTime> = None;
    for path in paths.all() {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(StationDataError::CacheMetadataRead(path.to_path_buf(), e)),
        };
        // Not every filesystem records a birth time.
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map_err(|e| StationDataError::CacheMetadataRead(path.to_path_buf(), e))?;
        earliest = Some(earliest.map_or(created, |e| e.min(created)));
    }
    Ok(earliest)
}

/// Removes all files of a station, ignoring the ones that do not exist.
async fn remove_files(paths: &DatasetPaths) -> Result<(), StationDataError> {
    for path in paths.all() {
        match fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StationDataError::CacheDeletion(path.to_path_buf(), e)),
        }
    }
    Ok(())
}
