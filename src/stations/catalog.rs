//! The master list of stations with temperature coverage.
//!
//! The catalog is built once from the GHCN station list and element
//! inventory, then persisted as `stations.csv` with the columns
//! `Station_ID,Latitude,Longitude,FirstYear,LastYear,Station_Name`. Later
//! runs load the persisted file and never rebuild it unless it is missing or
//! empty.

use crate::sources::MetadataSource;
use crate::stations::error::CatalogError;
use crate::types::station::Station;
use crate::utils::{read_csv, write_csv_atomic};
use log::info;
use polars::prelude::*;
use rstar::RTree;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub const CATALOG_FILE_NAME: &str = "stations.csv";

const STATION_LIST: &str = "station list";
const INVENTORY: &str = "inventory";

/// All known stations, indexed by ID and by location.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    by_id: HashMap<String, Station>,
    pub(crate) rtree: RTree<Station>,
}

/// One TMAX or TMIN line of the element inventory.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InventoryEntry {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub first_year: i32,
    pub last_year: i32,
}

/// One line of the station list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListedStation {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl StationCatalog {
    /// Loads the persisted catalog from `dir`, building and persisting it
    /// first if the file is missing or empty.
    ///
    /// # Errors
    ///
    /// Fails if the catalog cannot be read, or, when it has to be built, if
    /// either metadata resource cannot be fetched or parsed. There is no
    /// fallback: without a catalog no station can be offered.
    pub async fn open<M: MetadataSource>(dir: &Path, source: &M) -> Result<Self, CatalogError> {
        let path = dir.join(CATALOG_FILE_NAME);

        let has_catalog = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);

        if has_catalog {
            info!("Loading station catalog from {}", path.display());
            let stations = tokio::task::spawn_blocking(move || read_catalog(&path)).await??;
            return Ok(Self::from_stations(stations));
        }

        info!("Station catalog not found. Building it from the upstream metadata.");
        let station_list = source
            .fetch_station_list()
            .await
            .map_err(|source| CatalogError::Fetch {
                resource: STATION_LIST,
                source,
            })?;
        let inventory = source
            .fetch_inventory()
            .await
            .map_err(|source| CatalogError::Fetch {
                resource: INVENTORY,
                source,
            })?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CatalogError::CatalogDirCreation(dir.to_path_buf(), e))?;

        let stations = tokio::task::spawn_blocking(move || {
            let stations = build_stations(&station_list, &inventory)?;
            write_catalog(&path, &stations)?;
            info!(
                "Saved {} stations to {}",
                stations.len(),
                path.display()
            );
            Ok::<_, CatalogError>(stations)
        })
        .await??;

        Ok(Self::from_stations(stations))
    }

    pub fn from_stations(stations: Vec<Station>) -> Self {
        let by_id = stations
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect();
        Self {
            by_id,
            rtree: RTree::bulk_load(stations),
        }
    }

    pub fn get(&self, station_id: &str) -> Option<&Station> {
        self.by_id.get(station_id)
    }

    /// The full mapping from station ID to station.
    pub fn as_map(&self) -> &HashMap<String, Station> {
        &self.by_id
    }

    /// All stations, in no particular order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Joins the station list with the TMAX/TMIN inventory.
///
/// Every listed station appears exactly once, sorted by ID. Its coverage is
/// the latest first year and the earliest last year over its TMAX and TMIN
/// inventory lines, so both elements are available throughout. Stations
/// without such lines get `0` for both years and keep the station list
/// coordinates.
pub(crate) fn build_stations(
    station_list: &str,
    inventory: &str,
) -> Result<Vec<Station>, CatalogError> {
    let listed = parse_station_list(station_list)?;
    let mut coverage: HashMap<String, Vec<InventoryEntry>> = HashMap::new();
    for entry in parse_inventory(inventory)? {
        coverage.entry(entry.station_id.clone()).or_default().push(entry);
    }

    let mut merged: BTreeMap<String, Station> = BTreeMap::new();
    for item in listed {
        if merged.contains_key(&item.station_id) {
            continue;
        }
        let entries = coverage.get(&item.station_id).map(Vec::as_slice).unwrap_or(&[]);
        let (latitude, longitude) = entries
            .first()
            .map(|e| (e.latitude, e.longitude))
            .unwrap_or((item.latitude, item.longitude));
        let first_year = entries.iter().map(|e| e.first_year).max().unwrap_or(0);
        let last_year = entries.iter().map(|e| e.last_year).min().unwrap_or(0);

        merged.insert(
            item.station_id.clone(),
            Station {
                id: item.station_id,
                name: item.name,
                latitude,
                longitude,
                first_year,
                last_year,
            },
        );
    }

    if merged.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(merged.into_values().collect())
}

/// Substring of `line` at byte columns `start..end`, clipped to the line and trimmed.
fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start.min(end)..end).unwrap_or("").trim()
}

/// Parses the fixed-width station list: ID `0..11`, latitude `12..20`,
/// longitude `21..30`, name `41..71`.
pub(crate) fn parse_station_list(text: &str) -> Result<Vec<ListedStation>, CatalogError> {
    let mut stations = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let station_id = column(line, 0, 11);
        if station_id.is_empty() || line.len() < 41 {
            continue;
        }
        let coordinate = |field: &'static str, start, end| -> Result<f64, CatalogError> {
            let raw = column(line, start, end);
            raw.parse().map_err(|_| CatalogError::MalformedLine {
                resource: STATION_LIST,
                line: index + 1,
                field,
                value: raw.to_string(),
            })
        };
        stations.push(ListedStation {
            station_id: station_id.to_string(),
            latitude: coordinate("latitude", 12, 20)?,
            longitude: coordinate("longitude", 21, 30)?,
            name: column(line, 41, 71).to_string(),
        });
    }
    Ok(stations)
}

/// Parses the whitespace-delimited inventory, keeping TMAX and TMIN lines.
pub(crate) fn parse_inventory(text: &str) -> Result<Vec<InventoryEntry>, CatalogError> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let malformed = |field: &'static str, value: &str| CatalogError::MalformedLine {
            resource: INVENTORY,
            line: index + 1,
            field,
            value: value.to_string(),
        };
        if fields.len() < 6 {
            return Err(malformed("line", line));
        }
        if !matches!(fields[3], "TMAX" | "TMIN") {
            continue;
        }
        entries.push(InventoryEntry {
            station_id: fields[0].to_string(),
            latitude: fields[1].parse().map_err(|_| malformed("latitude", fields[1]))?,
            longitude: fields[2].parse().map_err(|_| malformed("longitude", fields[2]))?,
            first_year: fields[4].parse().map_err(|_| malformed("first year", fields[4]))?,
            last_year: fields[5].parse().map_err(|_| malformed("last year", fields[5]))?,
        });
    }
    Ok(entries)
}

fn catalog_schema() -> Schema {
    Schema::from_iter([
        Field::new("Station_ID".into(), DataType::String),
        Field::new("Latitude".into(), DataType::Float64),
        Field::new("Longitude".into(), DataType::Float64),
        Field::new("FirstYear".into(), DataType::Int32),
        Field::new("LastYear".into(), DataType::Int32),
        Field::new("Station_Name".into(), DataType::String),
    ])
}

pub(crate) fn write_catalog(path: &Path, stations: &[Station]) -> Result<(), CatalogError> {
    let mut df = df!(
        "Station_ID" => stations.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        "Latitude" => stations.iter().map(|s| s.latitude).collect::<Vec<_>>(),
        "Longitude" => stations.iter().map(|s| s.longitude).collect::<Vec<_>>(),
        "FirstYear" => stations.iter().map(|s| s.first_year).collect::<Vec<_>>(),
        "LastYear" => stations.iter().map(|s| s.last_year).collect::<Vec<_>>(),
        "Station_Name" => stations.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
    )
    .map_err(|e| CatalogError::CatalogWrite(path.to_path_buf(), e))?;
    write_csv_atomic(&mut df, path).map_err(|e| CatalogError::CatalogWrite(path.to_path_buf(), e))
}

pub(crate) fn read_catalog(path: &Path) -> Result<Vec<Station>, CatalogError> {
    let read_err = |e| CatalogError::CatalogRead(path.to_path_buf(), e);
    let df = read_csv(path, catalog_schema()).map_err(read_err)?;

    let ids = df.column("Station_ID").and_then(|c| c.str()).map_err(read_err)?;
    let lats = df.column("Latitude").and_then(|c| c.f64()).map_err(read_err)?;
    let lons = df.column("Longitude").and_then(|c| c.f64()).map_err(read_err)?;
    let firsts = df.column("FirstYear").and_then(|c| c.i32()).map_err(read_err)?;
    let lasts = df.column("LastYear").and_then(|c| c.i32()).map_err(read_err)?;
    let names = df.column("Station_Name").and_then(|c| c.str()).map_err(read_err)?;

    let mut stations = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let (Some(id), Some(latitude), Some(longitude)) =
            (ids.get(row), lats.get(row), lons.get(row))
        else {
            return Err(CatalogError::CatalogContent {
                path: path.to_path_buf(),
                message: format!("row {row} lacks an ID or coordinates"),
            });
        };
        stations.push(Station {
            id: id.to_string(),
            name: names.get(row).unwrap_or_default().to_string(),
            latitude,
            longitude,
            first_year: firsts.get(row).unwrap_or(0),
            last_year: lasts.get(row).unwrap_or(0),
        });
    }
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::error::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const STATION_LIST_TEXT: &str = "\
GME00102380  49.5030   11.0550  314.0    NUERNBERG                      GSN     10763
SFM00068816 -33.9690   18.6010   46.0    CAPE TOWN INTL                 GSN     68816
USC00047916  36.9906 -121.9911   39.6 CA SANTA CRUZ
ASN00066037 -33.9465  151.1731    6.0    SYDNEY AIRPORT AMO             GSN     94767
";

    const INVENTORY_TEXT: &str = "\
GME00102380  49.5030   11.0550 TMAX 1955 2024
GME00102380  49.5030   11.0550 TMIN 1951 2023
GME00102380  49.5030   11.0550 PRCP 1930 2024
SFM00068816 -33.9690   18.6010 TMAX 1957 2024
SFM00068816 -33.9690   18.6010 TMIN 1957 2024
USC00047916  36.9906 -121.9911 PRCP 1893 2024
XXX00000001  10.0000   10.0000 TMAX 1900 2000
";

    #[test]
    fn parses_fixed_width_station_list() {
        let listed = parse_station_list(STATION_LIST_TEXT).unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].station_id, "GME00102380");
        assert_eq!(listed[0].name, "NUERNBERG");
        assert_eq!(listed[1].latitude, -33.969);
        assert_eq!(listed[2].longitude, -121.9911);
        assert_eq!(listed[3].name, "SYDNEY AIRPORT AMO");
    }

    #[test]
    fn inventory_keeps_temperature_lines() {
        let entries = parse_inventory(INVENTORY_TEXT).unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| e.station_id != "USC00047916"));
    }

    #[test]
    fn malformed_inventory_year_is_reported() {
        let err = parse_inventory("GME00102380  49.5030   11.0550 TMAX 19x5 2024\n").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedLine { field: "first year", line: 1, .. }
        ));
    }

    #[test]
    fn coverage_is_intersection_of_tmax_and_tmin() {
        let stations = build_stations(STATION_LIST_TEXT, INVENTORY_TEXT).unwrap();
        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        // Sorted by ID, only listed stations.
        assert_eq!(ids, vec!["ASN00066037", "GME00102380", "SFM00068816", "USC00047916"]);

        let nuernberg = &stations[1];
        assert_eq!((nuernberg.first_year, nuernberg.last_year), (1955, 2023));

        // Listed but without temperature inventory.
        let santa_cruz = &stations[3];
        assert_eq!((santa_cruz.first_year, santa_cruz.last_year), (0, 0));
        assert_eq!(santa_cruz.latitude, 36.9906);
        assert_eq!(santa_cruz.name, "SANTA CRUZ");
    }

    #[test]
    fn empty_metadata_is_an_error() {
        assert!(matches!(build_stations("", ""), Err(CatalogError::Empty)));
    }

    #[test]
    fn catalog_file_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CATALOG_FILE_NAME);
        let stations = build_stations(STATION_LIST_TEXT, INVENTORY_TEXT).unwrap();
        write_catalog(&path, &stations).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let header = "Station_ID,Latitude,Longitude,FirstYear,LastYear,Station_Name\n";
        assert!(text.starts_with(header));
        assert_eq!(read_catalog(&path).unwrap(), stations);
    }

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MetadataSource for CountingSource {
        async fn fetch_station_list(&self) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::NotFound("stations".into()));
            }
            Ok(STATION_LIST_TEXT.to_string())
        }

        async fn fetch_inventory(&self) -> Result<String, FetchError> {
            Ok(INVENTORY_TEXT.to_string())
        }
    }

    #[tokio::test]
    async fn open_builds_once_then_loads() {
        let tmp = tempfile::tempdir().unwrap();
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        };

        let first = StationCatalog::open(tmp.path(), &source).await.unwrap();
        let second = StationCatalog::open(tmp.path(), &source).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.len(), 4);
        assert_eq!(second.get("SFM00068816"), first.get("SFM00068816"));
    }

    #[tokio::test]
    async fn empty_catalog_file_is_rebuilt() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CATALOG_FILE_NAME), "").unwrap();
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let catalog = StationCatalog::open(tmp.path(), &source).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(!catalog.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let err = StationCatalog::open(tmp.path(), &source).await.unwrap_err();
        assert!(matches!(err, CatalogError::Fetch { resource: "station list", .. }));
        assert!(!tmp.path().join(CATALOG_FILE_NAME).exists());
    }
}
