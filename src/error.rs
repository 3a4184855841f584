//! Error types for configuration and stay-record validation.

use thiserror::Error;

/// Result type for the occupancy pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Problems with the run configuration, raised before any data is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required setting {0} is not set")]
    MissingVar(&'static str),

    #[error("the window {0:?} is not formatted correctly")]
    MalformedWindow(String),

    #[error("the window unit {unit:?} in {window:?} is not supported")]
    UnsupportedUnit { window: String, unit: String },

    #[error("SITES must be a JSON array of site codes: {0}")]
    InvalidSites(String),
}

/// A single stay record that cannot be expanded into occupancy hours.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StayError {
    #[error("{field} {value:?} does not begin with an hour between 00 and 23")]
    InvalidHour { field: &'static str, value: String },

    #[error("departure {departure} precedes arrival {arrival}")]
    DepartureBeforeArrival { arrival: String, departure: String },
}

/// Crate-level error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The batch is aborted on the first bad record.
    #[error("stay record {index} (site {site_code}): {source}")]
    InvalidStay {
        index: usize,
        site_code: String,
        #[source]
        source: StayError,
    },
}
