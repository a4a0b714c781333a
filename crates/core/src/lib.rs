//! Core types and configuration for the ETF liquidity workspace.
//!
//! This crate provides shared types used across all other crates:
//! - Raw and normalized table types
//! - Configuration structures
//! - Error taxonomy for loading, normalization and statistics

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, ErrorKind, IngestError, LoadError, NormalizeError, Result};
pub use types::*;
