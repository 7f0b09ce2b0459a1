use crate::sources::error::FetchError;
use polars::error::PolarsError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a failed station build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The raw archive could not be downloaded.
    ArchiveFetchFailed,
    /// The archive was downloaded but its content is malformed.
    ArchiveParseFailed,
    /// An intermediate dataset was empty or inconsistent.
    AggregationFailed,
    /// Reading, writing or deleting cache files failed.
    StorageFailed,
    /// The build exceeded its time budget.
    TimedOut,
}

#[derive(Debug, Error)]
pub enum StationDataError {
    #[error("Failed to fetch archive for station '{station}'")]
    ArchiveFetch {
        station: String,
        #[source]
        source: FetchError,
    },

    #[error("Malformed {field} '{value}' on line {line} of the archive for station '{station}'")]
    MalformedRecord {
        station: String,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("No {stage} data left for station '{station}'")]
    EmptyDataset {
        station: String,
        stage: &'static str,
    },

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write dataset '{0}'")]
    DatasetWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to read dataset '{0}'")]
    DatasetRead(PathBuf, #[source] PolarsError),

    #[error("Unexpected content in dataset '{path}': {message}")]
    DatasetContent { path: PathBuf, message: String },

    #[error("Failed to list cache directory '{0}'")]
    CacheList(PathBuf, #[source] std::io::Error),

    #[error("Failed to read metadata for cache file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to delete cache file '{0}'")]
    CacheDeletion(PathBuf, #[source] std::io::Error),

    #[error("Fetching the archive of station '{station}' took longer than {timeout:?}")]
    Timeout { station: String, timeout: Duration },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl StationDataError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StationDataError::ArchiveFetch {
                source: FetchError::Encoding(..),
                ..
            } => FailureKind::ArchiveParseFailed,
            StationDataError::ArchiveFetch { .. } => FailureKind::ArchiveFetchFailed,
            StationDataError::MalformedRecord { .. } => FailureKind::ArchiveParseFailed,
            StationDataError::EmptyDataset { .. } => FailureKind::AggregationFailed,
            StationDataError::Timeout { .. } => FailureKind::TimedOut,
            StationDataError::CacheDirCreation(..)
            | StationDataError::DatasetWrite(..)
            | StationDataError::DatasetRead(..)
            | StationDataError::DatasetContent { .. }
            | StationDataError::CacheList(..)
            | StationDataError::CacheMetadataRead(..)
            | StationDataError::CacheDeletion(..)
            | StationDataError::TaskJoin(..) => FailureKind::StorageFailed,
        }
    }
}
