use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the miss ratio tools
#[derive(Error, Debug)]
pub enum MrcError {
    #[error("Usage: {0}")]
    UsageError(String),

    #[error("Failed to load input: {0}")]
    InputError(#[from] InputError),

    #[error("Failed to write output: {0}")]
    OutputError(#[from] OutputError),

    #[error("Failed to load trace: {0}")]
    TraceError(#[from] TraceError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Errors related to reading the miss ratio table
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read CSV file '{0}': {1}")]
    FileReadError(PathBuf, #[source] csv::Error),

    #[error("Malformed CSV in '{0}': {1}")]
    ParseError(PathBuf, #[source] csv::Error),

    #[error("CSV file '{0}' has no '{1}' column")]
    MissingColumn(PathBuf, &'static str),

    #[error("Invalid {column} '{value}' in '{path}' at line {line}")]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// Errors related to rendering and persisting the chart
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Unsupported image format for '{0}': expected svg, png, jpg, jpeg or bmp")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to render chart to '{0}': {1}")]
    RenderError(PathBuf, String),

    #[error("Failed to write '{0}': {1}")]
    WriteError(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV file '{0}': {1}")]
    CsvWriteError(PathBuf, #[source] csv::Error),
}

/// Errors related to memory access traces
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse trace file '{0}': {1}")]
    ParseError(PathBuf, String),

    #[error("Trace file '{0}' contains no accesses")]
    EmptyTrace(PathBuf),
}

/// Type alias for Result with MrcError
pub type MrcResult<T> = Result<T, MrcError>;
