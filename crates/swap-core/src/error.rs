//! Error types for swap-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in swap-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// A rate column has no date column in front of it
    #[error("rate column '{column}' at index {index} has no preceding date column")]
    MissingDateColumn { column: String, index: usize },

    /// Ticker appears more than once in the header row
    #[error("ticker '{0}' has more than one rate column")]
    DuplicateColumn(String),

    /// Mapped tickers with no `<ticker> Curncy` column
    #[error("no rate column for ticker(s): {}", .0.join(", "))]
    MissingTickers(Vec<String>),

    /// Mapping has no entries
    #[error("maturity mapping is empty")]
    EmptyMapping,

    /// Ticker listed twice in a mapping
    #[error("ticker '{0}' appears more than once in the mapping")]
    DuplicateTicker(String),

    /// Maturity label not of the form `<n>[W|M|Y]`
    #[error("invalid maturity label '{0}'")]
    InvalidMaturity(String),

    /// Unknown curve set name
    #[error("unknown curve set '{0}'")]
    UnknownCurveSet(String),

    /// Unknown export format
    #[error("unknown format '{0}' (expected csv or json)")]
    UnknownFormat(String),

    /// Unknown alignment mode
    #[error("unknown alignment mode '{0}' (expected strict or legacy)")]
    UnknownMode(String),

    /// Date cell could not be parsed
    #[error("invalid date '{value}' in column {column}, row {row}")]
    InvalidDate {
        column: usize,
        row: usize,
        value: String,
    },

    /// Same observation date appears twice in one series
    #[error("date {date} appears more than once in the series for '{ticker}'")]
    DuplicateDate {
        ticker: String,
        date: chrono::NaiveDate,
    },

    /// Job input names neither a curve set nor a mapping file
    #[error("job input '{0}' needs exactly one of 'curve' or 'mapping'")]
    InvalidJobInput(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
