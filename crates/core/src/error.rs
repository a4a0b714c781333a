//! Error types for the ETF liquidity workspace.
//!
//! Loading and normalization failures are `Clone` so that a memoized
//! failure can be handed out again unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Flat discriminant shared by every error in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnsupportedFormat,
    MalformedInput,
    MissingDateColumn,
    AmbiguousDateColumn,
    InvalidDateValue,
    NoAssetColumns,
    DuplicateAsset,
    UnknownAsset,
    SameAsset,
    InsufficientData,
    Config,
    Json,
}

impl ErrorKind {
    /// Stable name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFormat => "UnsupportedFormat",
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::MissingDateColumn => "MissingDateColumn",
            ErrorKind::AmbiguousDateColumn => "AmbiguousDateColumn",
            ErrorKind::InvalidDateValue => "InvalidDateValue",
            ErrorKind::NoAssetColumns => "NoAssetColumns",
            ErrorKind::DuplicateAsset => "DuplicateAsset",
            ErrorKind::UnknownAsset => "UnknownAsset",
            ErrorKind::SameAsset => "SameAsset",
            ErrorKind::InsufficientData => "InsufficientData",
            ErrorKind::Config => "Config",
            ErrorKind::Json => "Json",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed parse strategy and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptFailure {
    /// Strategy name, e.g. `csv[;]`.
    pub strategy: String,
    /// Underlying parser message.
    pub reason: String,
}

impl AttemptFailure {
    pub fn new(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Failure of the format detection and loading stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// File suffix is not one of the accepted formats.
    #[error("Unsupported format: '{file_name}' (expected .xlsx, .csv or .xml)")]
    UnsupportedFormat { file_name: String },

    /// Recognized format, but no parse strategy could read the content.
    #[error("Malformed input: {detail}")]
    MalformedInput {
        detail: String,
        attempts: Vec<AttemptFailure>,
    },
}

impl LoadError {
    /// Create an unsupported format error.
    pub fn unsupported_format(file_name: impl Into<String>) -> Self {
        LoadError::UnsupportedFormat {
            file_name: file_name.into(),
        }
    }

    /// Create a malformed input error without attempt history.
    pub fn malformed(detail: impl Into<String>) -> Self {
        LoadError::MalformedInput {
            detail: detail.into(),
            attempts: Vec::new(),
        }
    }

    /// Create a malformed input error from every failed strategy, in order.
    pub fn from_attempts(attempts: Vec<AttemptFailure>) -> Self {
        let detail = attempts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        LoadError::MalformedInput { detail, attempts }
    }

    /// Failed strategies recorded on this error.
    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            LoadError::MalformedInput { attempts, .. } => attempts,
            LoadError::UnsupportedFormat { .. } => &[],
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            LoadError::MalformedInput { .. } => ErrorKind::MalformedInput,
        }
    }
}

/// Failure of the normalization stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// No column resolves to the date marker.
    #[error("Missing date column: no column resolves to '{marker}' (is the header on the first row?)")]
    MissingDateColumn { marker: String },

    /// More than one column resolves to the date marker.
    #[error("Ambiguous date column: columns {columns:?} all resolve to '{marker}'")]
    AmbiguousDateColumn { marker: String, columns: Vec<usize> },

    /// A date cell could not be parsed. `row` is the zero-based data row in source order.
    #[error("Invalid date value at row {row}: '{value}'")]
    InvalidDateValue { row: usize, value: String },

    /// Nothing but the date column survived.
    #[error("No asset columns: no ticker such as BOVA11 was identified in the header")]
    NoAssetColumns,

    /// Two source columns reduce to the same asset identifier.
    #[error("Duplicate asset '{asset}' from source columns {first} and {second}")]
    DuplicateAsset {
        asset: String,
        first: usize,
        second: usize,
    },
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NormalizeError::MissingDateColumn { .. } => ErrorKind::MissingDateColumn,
            NormalizeError::AmbiguousDateColumn { .. } => ErrorKind::AmbiguousDateColumn,
            NormalizeError::InvalidDateValue { .. } => ErrorKind::InvalidDateValue,
            NormalizeError::NoAssetColumns => ErrorKind::NoAssetColumns,
            NormalizeError::DuplicateAsset { .. } => ErrorKind::DuplicateAsset,
        }
    }
}

/// Failure of the load-then-normalize pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Load(e) => e.kind(),
            IngestError::Normalize(e) => e.kind(),
        }
    }
}

/// Main error type for the workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Loading or normalization failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested asset is not a column of the table.
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// A comparison was asked between an asset and itself.
    #[error("Select two different assets to compare (got {0} twice)")]
    SameAsset(String),

    /// Insufficient data for computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Self {
        Error::Ingest(e.into())
    }
}

impl From<NormalizeError> for Error {
    fn from(e: NormalizeError) -> Self {
        Error::Ingest(e.into())
    }
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create an unknown asset error.
    pub fn unknown_asset(asset: impl Into<String>) -> Self {
        Error::UnknownAsset(asset.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Ingest(e) => e.kind(),
            Error::Config(_) => ErrorKind::Config,
            Error::UnknownAsset(_) => ErrorKind::UnknownAsset,
            Error::SameAsset(_) => ErrorKind::SameAsset,
            Error::InsufficientData(_) => ErrorKind::InsufficientData,
            Error::Json(_) => ErrorKind::Json,
        }
    }
}
