//! Error types for the parsing and joining stages.

use thiserror::Error;

/// A location string that could not be turned into a coordinate pair.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("invalid coordinate format: {0:?}")]
    InvalidFormat(String),

    #[error("invalid coordinate value: {0:?}")]
    InvalidValue(String),
}

/// Failure while building the stop registry. Aborts the whole build.
#[derive(Error, Debug)]
pub enum StopError {
    #[error("failed to parse stop on row {row}")]
    StopParsingFailed {
        /// 1-based row index in the stop file, header excluded
        row: usize,
        #[source]
        source: CoordinateError,
    },

    #[error("impossible to read stop file")]
    Csv(#[from] csv::Error),
}

/// Failure while assembling a feed from a workbook and a stop list.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error(transparent)]
    Stops(#[from] StopError),

    #[error("impossible to read workbook")]
    Workbook(#[from] calamine::Error),

    #[error("stop {stop_name:?} on route {route_id:?} is not in the stop list")]
    UnresolvedStop { route_id: String, stop_name: String },
}
