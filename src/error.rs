//! Error types for osm2poi

use std::path::PathBuf;
use thiserror::Error;

use crate::api::Dataset;

/// Failure to obtain a raw dataset
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No Overpass endpoints configured")]
    NoEndpoints,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Overpass API at {url} returned error status: {status}")]
    Status { url: String, status: u16 },

    #[error("Overpass API failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid Overpass JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum EnrichError {
    /// Any dataset failure aborts the whole run
    #[error("Failed to load {dataset} dataset: {source}")]
    Dataset {
        dataset: Dataset,
        #[source]
        source: FetchError,
    },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: &'static str, reason: String },

    #[error("Failed to write output to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = EnrichError> = std::result::Result<T, E>;
