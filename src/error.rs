use crate::stations::error::CatalogError;
use crate::weather_data::error::StationDataError;
use std::path::PathBuf;
use thiserror::Error;

/// Text shown to end users for any failure to produce station data.
pub const DATA_UNAVAILABLE_MESSAGE: &str = "Data temporarily unavailable, please try again later.";
/// Text shown to end users when the station list cannot be loaded.
pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "Station list temporarily unavailable, please try again later.";
pub const UNKNOWN_STATION_MESSAGE: &str = "Unknown station.";
/// Text shown to end users when the local data directory is unusable.
pub const STORAGE_UNAVAILABLE_MESSAGE: &str = "Local data storage is unavailable.";

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("The station catalog is unavailable")]
    CatalogUnavailable(#[source] CatalogError),

    #[error(transparent)]
    StationData(#[from] StationDataError),

    #[error("Unknown station '{0}'")]
    UnknownStation(String),

    #[error("Failed to create data directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine data directory")]
    CacheDirResolution(#[source] std::io::Error),
}

impl ExplorerError {
    /// A message that is safe to show to end users.
    ///
    /// Every variant maps to a fixed text that never contains paths, station
    /// IDs or error causes; those are only logged.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExplorerError::StationData(_) => DATA_UNAVAILABLE_MESSAGE,
            ExplorerError::CatalogUnavailable(_) => CATALOG_UNAVAILABLE_MESSAGE,
            ExplorerError::UnknownStation(_) => UNKNOWN_STATION_MESSAGE,
            ExplorerError::CacheDirCreation(..) | ExplorerError::CacheDirResolution(_) => {
                STORAGE_UNAVAILABLE_MESSAGE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn station_data_failures_share_one_message() {
        let timeout = ExplorerError::from(StationDataError::Timeout {
            station: "USC00047916".into(),
            timeout: Duration::from_secs(60),
        });
        let empty = ExplorerError::from(StationDataError::EmptyDataset {
            station: "USC00047916".into(),
            stage: "temperature",
        });
        assert_eq!(timeout.user_message(), DATA_UNAVAILABLE_MESSAGE);
        assert_eq!(empty.user_message(), DATA_UNAVAILABLE_MESSAGE);
        assert!(!timeout.to_string().is_empty());
    }

    #[test]
    fn unknown_station_message_does_not_echo_input() {
        let err = ExplorerError::UnknownStation("<script>".into());
        assert_eq!(err.user_message(), UNKNOWN_STATION_MESSAGE);
        assert_eq!(err.to_string(), "Unknown station '<script>'");
    }

    #[test]
    fn storage_failures_hide_the_path() {
        let creation = ExplorerError::CacheDirCreation(
            PathBuf::from("/srv/private/ghcnd"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let resolution = ExplorerError::CacheDirResolution(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no cache dir",
        ));
        assert_eq!(creation.user_message(), STORAGE_UNAVAILABLE_MESSAGE);
        assert_eq!(resolution.user_message(), STORAGE_UNAVAILABLE_MESSAGE);
        assert!(!creation.user_message().contains("/srv"));
        assert!(creation.to_string().contains("/srv/private/ghcnd"));
    }
}
