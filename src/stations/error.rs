use crate::sources::error::FetchError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch the {resource}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("Malformed {field} '{value}' on line {line} of the {resource}")]
    MalformedLine {
        resource: &'static str,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("The station list and inventory contain no stations")]
    Empty,

    #[error("Failed to create catalog directory '{0}'")]
    CatalogDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write station catalog '{0}'")]
    CatalogWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to read station catalog '{0}'")]
    CatalogRead(PathBuf, #[source] PolarsError),

    #[error("Unexpected content in station catalog '{path}': {message}")]
    CatalogContent { path: PathBuf, message: String },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
