//! Upload ingestion and normalization for the ETF liquidity workspace.
//!
//! This crate handles:
//! - File format detection by suffix
//! - Delimited-text, spreadsheet and record-markup loading with fallbacks
//! - Ticker extraction from noisy column headers
//! - Date-axis parsing, validation and ordering
//! - Memoization of ingested uploads by content hash

pub mod cache;
pub mod csv_reader;
pub mod dates;
pub mod format;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod strategy;
pub mod ticker;
pub mod xlsx_reader;
pub mod xml_reader;

pub use cache::{CacheKey, CacheStats, IngestCache};
pub use dates::{DateParser, FieldOrder};
pub use format::FileFormat;
pub use loader::{load, Loader};
pub use normalizer::Normalizer;
pub use pipeline::{ingest, normalize, Pipeline};
pub use strategy::ParseStrategy;
pub use ticker::{ExtractedLabel, LabelExtractor, LabelRule};
