// 🚨 Error Taxonomy
// Typed failures surfaced by the load pipeline and the query surface.
//
// Recoverable conditions (optional source missing, unparseable period,
// too little series data) are NOT errors: they show up as report entries
// or `None` values. Only the cases below reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading a single tabular source.
///
/// "File not found" is never a `ReadError` - the reader turns it into an
/// empty frame. Everything else (permissions, bad UTF-8, ragged rows) ends
/// up here and the pipeline treats the source as unavailable.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("source unavailable: {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed source: {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors returned by the library API.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// The primary dataset could not be read. Fatal: no table is produced.
    #[error("mandatory source '{name}' missing at {path}: {reason}")]
    MandatorySourceMissing {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// A query referenced a region that is not in the table.
    #[error("region not found: {0}")]
    NotFound(String),

    /// A query argument could not be interpreted (e.g. an unknown sort order).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AtlasError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AtlasError::NotFound(_))
    }
}

pub type AtlasResult<T> = Result<T, AtlasError>;
