use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

const CACHE_DIR_NAME: &str = "ghcnd_explorer";

pub fn get_cache_dir() -> io::Result<PathBuf> {
    dirs::cache_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no system cache directory"))
        .map(|p| p.join(CACHE_DIR_NAME))
}

pub async fn ensure_cache_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("cache path is not a directory: {}", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

/// Writes `df` as CSV with a header row, replacing `path` atomically.
///
/// The frame is written to a temporary file next to `path` and renamed into
/// place, so readers never observe a partially written file.
pub(crate) fn write_csv_atomic(df: &mut DataFrame, path: &Path) -> PolarsResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    CsvWriter::new(&mut tmp).include_header(true).finish(df)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Reads a CSV file with a header row using an explicit schema.
pub(crate) fn read_csv(path: &Path, schema: Schema) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_schema(Some(Arc::new(schema)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

/// Lazily scans a CSV file with a header row using an explicit schema.
pub(crate) fn scan_csv(path: &Path, schema: Schema) -> PolarsResult<LazyFrame> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_schema(Some(Arc::new(schema)))
        .finish()
}

/// Rounds to two decimal places, ties to even.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Arithmetic mean of the present values, `None` if there are none.
pub(crate) fn mean_of_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
