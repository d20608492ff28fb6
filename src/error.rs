//! Error types for catalog calls and the import pipeline.
//!
//! Catalog errors come from a single remote call. The import errors describe what a
//! failed call means for the run: [`SourceLoadError`], [`ProvisionError`] and
//! [`ImportError`] end it, the others are recorded in the report and the run goes on.

use std::{path::PathBuf, time::Duration};

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of one request against the Catalog Service.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limited by the catalog service")]
    RateLimited { retry_after: Option<Duration> },

    #[error("catalog service unavailable ({status})")]
    Server { status: StatusCode },

    #[error("catalog service rejected the request ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("unexpected response from the catalog service: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CatalogError {
    /// Whether repeating the same call later may succeed.
    ///
    /// Rate limiting, 5xx answers and connection level failures are transient.
    /// Everything the service rejected on its merits is not.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::RateLimited { .. } | CatalogError::Server { .. } => true,
            CatalogError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CatalogError::Api { .. } | CatalogError::Decode(_) | CatalogError::InvalidRequest(_) => {
                false
            }
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CatalogError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is missing the `{column}` column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{path}: malformed row: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{0} contains no records")]
    Empty(PathBuf),
}

#[derive(Debug, Error)]
#[error("failed to create playlist `{name}`: {source}")]
pub struct ProvisionError {
    pub name: String,
    #[source]
    pub source: CatalogError,
}

#[derive(Debug, Error)]
#[error("search for `{query}` failed: {source}")]
pub struct ResolutionError {
    pub query: String,
    #[source]
    pub source: CatalogError,
}

/// A chunk that could not be added to the playlist.
#[derive(Debug, Error)]
#[error("batch {index} ({size} tracks) was not added: {source}")]
pub struct BatchSubmitError {
    pub index: usize,
    pub size: usize,
    #[source]
    pub source: CatalogError,
}

#[derive(Debug, Error)]
pub enum CoverAttachError {
    #[error("cannot read cover image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cover image {0} is empty")]
    EmptyImage(PathBuf),

    #[error("cover upload failed: {0}")]
    Upload(#[from] CatalogError),
}

/// Fatal outcome of an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    SourceLoad(#[from] SourceLoadError),

    #[error("cannot identify the current user: {0}")]
    Identity(#[source] CatalogError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("import cancelled during {stage}")]
    Cancelled { stage: crate::import::Stage },
}
