//! CSV persistence of the three per-station datasets.
//!
//! | file                 | columns                                       |
//! |----------------------|-----------------------------------------------|
//! | `{id}.csv`           | `Station_ID,Year,Month,Day,Element,Value`     |
//! | `{id}_monthly.csv`   | `Station_ID,Year,Month,TMAX,TMIN`             |
//! | `{id}_yearly.csv`    | `Station_ID,Year,TMAX,TMIN`                   |

use crate::types::aggregates::{MonthlyAggregate, YearlyAggregate};
use crate::types::observation::{CleanedObservation, Element};
use crate::utils::{read_csv, write_csv_atomic};
use crate::weather_data::error::StationDataError;
use polars::prelude::*;
use std::path::{Path, PathBuf};

pub(crate) const MONTHLY_SUFFIX: &str = "_monthly.csv";
pub(crate) const YEARLY_SUFFIX: &str = "_yearly.csv";

/// Locations of the three dataset files of one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub observations: PathBuf,
    pub monthly: PathBuf,
    pub yearly: PathBuf,
}

impl DatasetPaths {
    pub fn new(dir: &Path, station_id: &str) -> Self {
        Self {
            observations: dir.join(format!("{station_id}.csv")),
            monthly: dir.join(format!("{station_id}{MONTHLY_SUFFIX}")),
            yearly: dir.join(format!("{station_id}{YEARLY_SUFFIX}")),
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [&self.observations, &self.monthly, &self.yearly]
    }

    pub fn all_exist(&self) -> bool {
        self.all().iter().all(|p| p.is_file())
    }
}

pub(crate) fn observations_schema() -> Schema {
    Schema::from_iter([
        Field::new("Station_ID".into(), DataType::String),
        Field::new("Year".into(), DataType::Int32),
        Field::new("Month".into(), DataType::Int32),
        Field::new("Day".into(), DataType::Int32),
        Field::new("Element".into(), DataType::String),
        Field::new("Value".into(), DataType::Float64),
    ])
}

pub(crate) fn monthly_schema() -> Schema {
    Schema::from_iter([
        Field::new("Station_ID".into(), DataType::String),
        Field::new("Year".into(), DataType::Int32),
        Field::new("Month".into(), DataType::Int32),
        Field::new("TMAX".into(), DataType::Float64),
        Field::new("TMIN".into(), DataType::Float64),
    ])
}

pub(crate) fn yearly_schema() -> Schema {
    Schema::from_iter([
        Field::new("Station_ID".into(), DataType::String),
        Field::new("Year".into(), DataType::Int32),
        Field::new("TMAX".into(), DataType::Float64),
        Field::new("TMIN".into(), DataType::Float64),
    ])
}

pub(crate) fn write_observations(
    path: &Path,
    rows: &[CleanedObservation],
) -> Result<(), StationDataError> {
    let mut df = df!(
        "Station_ID" => rows.iter().map(|r| r.station_id.as_str()).collect::<Vec<_>>(),
        "Year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        "Month" => rows.iter().map(|r| r.month as i32).collect::<Vec<_>>(),
        "Day" => rows.iter().map(|r| r.day as i32).collect::<Vec<_>>(),
        "Element" => rows.iter().map(|r| r.element.code()).collect::<Vec<_>>(),
        "Value" => rows.iter().map(|r| r.value).collect::<Vec<_>>(),
    )
    .map_err(|e| StationDataError::DatasetWrite(path.to_path_buf(), e))?;
    write_csv_atomic(&mut df, path)
        .map_err(|e| StationDataError::DatasetWrite(path.to_path_buf(), e))
}

pub(crate) fn write_monthly(
    path: &Path,
    rows: &[MonthlyAggregate],
) -> Result<(), StationDataError> {
    let mut df = df!(
        "Station_ID" => rows.iter().map(|r| r.station_id.as_str()).collect::<Vec<_>>(),
        "Year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        "Month" => rows.iter().map(|r| r.month as i32).collect::<Vec<_>>(),
        "TMAX" => rows.iter().map(|r| r.tmax).collect::<Vec<_>>(),
        "TMIN" => rows.iter().map(|r| r.tmin).collect::<Vec<_>>(),
    )
    .map_err(|e| StationDataError::DatasetWrite(path.to_path_buf(), e))?;
    write_csv_atomic(&mut df, path)
        .map_err(|e| StationDataError::DatasetWrite(path.to_path_buf(), e))
}

pub(crate) fn write_yearly(path: &Path, rows: &[YearlyAggregate]) -> Result<(), StationDataError> {
    let mut df = df!(
        "Station_ID" => rows.iter().map(|r| r.station_id.as_str()).collect::<Vec<_>>(),
        "Year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        "TMAX" => rows.iter().map(|r| r.tmax).collect::<Vec<_>>(),
        "TMIN" => rows.iter().map(|r| r.tmin).collect::<Vec<_>>(),
    )
    .map_err(|e| StationDataError::DatasetWrite(path.to_path_buf(), e))?;
    write_csv_atomic(&mut df, path)
        .map_err(|e| StationDataError::DatasetWrite(path.to_path_buf(), e))
}

/// Column accessors for a frame read from `path`, mapping every failure to
/// a dataset error for that file.
struct FrameColumns<'a> {
    df: DataFrame,
    path: &'a Path,
}

impl<'a> FrameColumns<'a> {
    fn read(path: &'a Path, schema: Schema) -> Result<Self, StationDataError> {
        let df = read_csv(path, schema)
            .map_err(|e| StationDataError::DatasetRead(path.to_path_buf(), e))?;
        Ok(Self { df, path })
    }

    fn missing(&self, column: &str, row: usize) -> StationDataError {
        StationDataError::DatasetContent {
            path: self.path.to_path_buf(),
            message: format!("missing {column} in row {row}"),
        }
    }

    fn strings(&self, name: &str) -> Result<Vec<String>, StationDataError> {
        let ca = self
            .df
            .column(name)
            .and_then(|c| c.str())
            .map_err(|e| StationDataError::DatasetRead(self.path.to_path_buf(), e))?;
        ca.into_iter()
            .enumerate()
            .map(|(row, v)| v.map(str::to_string).ok_or_else(|| self.missing(name, row)))
            .collect()
    }

    fn ints(&self, name: &str) -> Result<Vec<i32>, StationDataError> {
        let ca = self
            .df
            .column(name)
            .and_then(|c| c.i32())
            .map_err(|e| StationDataError::DatasetRead(self.path.to_path_buf(), e))?;
        ca.into_iter()
            .enumerate()
            .map(|(row, v)| v.ok_or_else(|| self.missing(name, row)))
            .collect()
    }

    fn floats(&self, name: &str) -> Result<Vec<Option<f64>>, StationDataError> {
        let ca = self
            .df
            .column(name)
            .and_then(|c| c.f64())
            .map_err(|e| StationDataError::DatasetRead(self.path.to_path_buf(), e))?;
        Ok(ca.into_iter().collect())
    }
}

pub(crate) fn read_observations(path: &Path) -> Result<Vec<CleanedObservation>, StationDataError> {
    let frame = FrameColumns::read(path, observations_schema())?;
    let ids = frame.strings("Station_ID")?;
    let years = frame.ints("Year")?;
    let months = frame.ints("Month")?;
    let days = frame.ints("Day")?;
    let elements = frame.strings("Element")?;
    let values = frame.floats("Value")?;

    ids.into_iter()
        .zip(years)
        .zip(months)
        .zip(days)
        .zip(elements)
        .zip(values)
        .enumerate()
        .map(|(row, (((((station_id, year), month), day), element), value))| {
            Ok(CleanedObservation {
                station_id,
                year,
                month: month as u32,
                day: day as u32,
                element: element.parse::<Element>().unwrap_or_else(|never| match never {}),
                value: value.ok_or_else(|| frame.missing("Value", row))?,
            })
        })
        .collect()
}

pub(crate) fn read_monthly(path: &Path) -> Result<Vec<MonthlyAggregate>, StationDataError> {
    let frame = FrameColumns::read(path, monthly_schema())?;
    let ids = frame.strings("Station_ID")?;
    let years = frame.ints("Year")?;
    let months = frame.ints("Month")?;
    let tmax = frame.floats("TMAX")?;
    let tmin = frame.floats("TMIN")?;

    Ok(ids
        .into_iter()
        .zip(years)
        .zip(months)
        .zip(tmax)
        .zip(tmin)
        .map(|((((station_id, year), month), tmax), tmin)| MonthlyAggregate {
            station_id,
            year,
            month: month as u32,
            tmax,
            tmin,
        })
        .collect())
}

pub(crate) fn read_yearly(path: &Path) -> Result<Vec<YearlyAggregate>, StationDataError> {
    let frame = FrameColumns::read(path, yearly_schema())?;
    let ids = frame.strings("Station_ID")?;
    let years = frame.ints("Year")?;
    let tmax = frame.floats("TMAX")?;
    let tmin = frame.floats("TMIN")?;

    Ok(ids
        .into_iter()
        .zip(years)
        .zip(tmax)
        .zip(tmin)
        .map(|(((station_id, year), tmax), tmin)| YearlyAggregate {
            station_id,
            year,
            tmax,
            tmin,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_station_naming() {
        let paths = DatasetPaths::new(Path::new("/data/stations"), "SFM00068816");
        assert_eq!(paths.observations, Path::new("/data/stations/SFM00068816.csv"));
        assert_eq!(paths.monthly, Path::new("/data/stations/SFM00068816_monthly.csv"));
        assert_eq!(paths.yearly, Path::new("/data/stations/SFM00068816_yearly.csv"));
    }

    #[test]
    fn monthly_with_missing_values_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("X_monthly.csv");
        let rows = vec![
            MonthlyAggregate {
                station_id: "SFM00068816".into(),
                year: 2001,
                month: 1,
                tmax: Some(26.13),
                tmin: None,
            },
            MonthlyAggregate {
                station_id: "SFM00068816".into(),
                year: 2001,
                month: 2,
                tmax: None,
                tmin: None,
            },
        ];
        write_monthly(&path, &rows).unwrap();
        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("Station_ID,Year,Month,TMAX,TMIN\n"));
        assert_eq!(read_monthly(&path).unwrap(), rows);
    }

    #[test]
    fn observations_keep_leading_zero_ids_and_elements() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("X.csv");
        let rows = vec![CleanedObservation {
            station_id: "ASN00066037".into(),
            year: 1990,
            month: 2,
            day: 31,
            element: Element::Tmin,
            value: -0.4,
        }];
        write_observations(&path, &rows).unwrap();
        assert_eq!(read_observations(&path).unwrap(), rows);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_yearly(Path::new("/nonexistent/X_yearly.csv")).unwrap_err();
        assert!(matches!(err, StationDataError::DatasetRead(..)));
    }
}
