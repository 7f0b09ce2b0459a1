//! The three processed datasets of a station, as returned by the station cache.

use crate::types::aggregates::{Hemisphere, MonthlyAggregate, SeasonalRow, YearlyAggregate};
use crate::types::observation::CleanedObservation;
use crate::types::year_span::YearSpan;
use crate::utils::scan_csv;
use crate::weather_data::aggregator::seasonal_summary_within;
use crate::weather_data::error::StationDataError;
use crate::weather_data::storage::{
    monthly_schema, observations_schema, yearly_schema, DatasetPaths,
};
use polars::prelude::LazyFrame;

/// Cleaned observations plus monthly and yearly aggregates of one station.
///
/// The rows are held in memory. The `*_frame` methods additionally expose the
/// persisted CSV files as Polars `LazyFrame`s; those scans fail once the
/// station has been evicted from the cache.
#[derive(Debug, Clone)]
pub struct StationDatasets {
    pub station_id: String,
    pub observations: Vec<CleanedObservation>,
    pub monthly: Vec<MonthlyAggregate>,
    pub yearly: Vec<YearlyAggregate>,
    pub paths: DatasetPaths,
}

impl StationDatasets {
    /// Seasonal summary of the years in `years`, see [`seasonal_summary_within`].
    pub fn seasonal(&self, hemisphere: Hemisphere, years: YearSpan) -> Vec<SeasonalRow> {
        seasonal_summary_within(&self.monthly, hemisphere, years)
    }

    pub fn observations_frame(&self) -> Result<LazyFrame, StationDataError> {
        scan_csv(&self.paths.observations, observations_schema())
            .map_err(|e| StationDataError::DatasetRead(self.paths.observations.clone(), e))
    }

    pub fn monthly_frame(&self) -> Result<LazyFrame, StationDataError> {
        scan_csv(&self.paths.monthly, monthly_schema())
            .map_err(|e| StationDataError::DatasetRead(self.paths.monthly.clone(), e))
    }

    pub fn yearly_frame(&self) -> Result<LazyFrame, StationDataError> {
        scan_csv(&self.paths.yearly, yearly_schema())
            .map_err(|e| StationDataError::DatasetRead(self.paths.yearly.clone(), e))
    }
}
