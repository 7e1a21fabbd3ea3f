//! Error types.
//!
//! `ReportError` covers everything that can go wrong while reading a status
//! report. None of it is recovered locally: a report that does not match the
//! expected layout aborts the cycle.

use std::path::PathBuf;

use thiserror::Error;

use crate::extraction::values::Direction;

/// Report layout or content did not match the expected grammar.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReportError {
    #[error("malformed report: no section found")]
    MalformedReport,
    #[error("section {0:?} appears more than once")]
    DuplicateSection(String),
    #[error("missing section {0:?}")]
    MissingSection(String),
    #[error("missing or unparsable field {0:?}")]
    MissingField(String),
    #[error("field {0:?} matched more than one line")]
    AmbiguousField(String),
    #[error("unexpected unit for {metric} ({direction}): got {got:?}")]
    UnexpectedUnit {
        metric: String,
        direction: Direction,
        got: String,
    },
    #[error("unknown connection event kind {0:?}")]
    UnknownEventKind(String),
    #[error("invalid local timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("no connection event in the report")]
    NoEventsObserved,
}

/// Report retrieval failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("cannot read report file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistent store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored timestamp {0:?} cannot be decoded")]
    Timestamp(String),
    #[error("transaction error: {0}")]
    Transaction(String),
}

/// Invalid runtime configuration value.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Failure of one ingestion cycle.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
