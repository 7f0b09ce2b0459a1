mod config;
mod error;
mod explorer;
mod sources;
mod stations;
mod types;
mod utils;
mod weather_data;

pub use config::ExplorerConfig;
pub use error::{
    ExplorerError, CATALOG_UNAVAILABLE_MESSAGE, DATA_UNAVAILABLE_MESSAGE,
    STORAGE_UNAVAILABLE_MESSAGE, UNKNOWN_STATION_MESSAGE,
};
pub use explorer::*;

pub use sources::error::FetchError;
pub use sources::noaa::*;
pub use sources::{ArchiveSource, MetadataSource};

pub use stations::catalog::{StationCatalog, CATALOG_FILE_NAME};
pub use stations::error::CatalogError;
pub use stations::locate_station::haversine_km;

pub use types::aggregates::*;
pub use types::observation::*;
pub use types::station::Station;
pub use types::year_span::*;

pub use weather_data::aggregator::{
    monthly_averages, seasonal_summary, seasonal_summary_within, yearly_averages,
};
pub use weather_data::cache::{StationCache, DEFAULT_CACHE_CAPACITY};
pub use weather_data::cleaner::clean_observations;
pub use weather_data::datasets::StationDatasets;
pub use weather_data::error::{FailureKind, StationDataError};
pub use weather_data::parser::{parse_archive, MISSING_VALUE, RECORD_LEN};
pub use weather_data::storage::DatasetPaths;
