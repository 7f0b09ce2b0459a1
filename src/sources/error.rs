use std::string::FromUtf8Error;
use thiserror::Error;

/// Failures while retrieving a resource from an upstream source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {0} failed")]
    DownloadIo(String, #[source] std::io::Error),

    #[error("Response body of {0} is not valid UTF-8")]
    Encoding(String, #[source] FromUtf8Error),

    #[error("Resource {0} not found")]
    NotFound(String),
}
