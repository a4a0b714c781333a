//! Liquidity statistics over normalized tables.
//!
//! This crate handles:
//! - Coercion of raw observation cells into volumes
//! - Per-asset summaries (mean, median, dispersion, period covered)
//! - Side-by-side comparison of two assets

pub mod coerce;
pub mod comparison;
pub mod summary;

pub use coerce::{coerce_volume, numeric_series};
pub use comparison::{compare, LiquidityComparison};
pub use summary::{summarize, summarize_all, LiquiditySummary};
