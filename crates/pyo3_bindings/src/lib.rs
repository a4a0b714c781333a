//! PyO3 bindings for the ETF liquidity Rust components.
//!
//! Exposes the ingestion pipeline and liquidity statistics to Python:
//! - Upload ingestion (xlsx / csv / xml) into a normalized table
//! - A memoizing session for repeated uploads of the same file
//! - Per-asset summaries and two-asset comparison

use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

use liquidity_core::{
    Config as RustConfig, Error as RustError, NormalizedTable as RustNormalizedTable,
};
use liquidity_ingestion::{IngestCache, Pipeline};
use liquidity_stats::{
    LiquidityComparison as RustLiquidityComparison, LiquiditySummary as RustLiquiditySummary,
};

/// Map any workspace error to `ValueError("<Kind>: <message>")`.
fn to_py_err(err: impl Into<RustError>) -> PyErr {
    let err = err.into();
    PyValueError::new_err(format!("{}: {}", err.kind(), err))
}

fn iso(dt: &NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// A normalized, date-ascending liquidity table.
#[pyclass(frozen)]
#[derive(Clone)]
pub struct NormalizedTable {
    inner: Arc<RustNormalizedTable>,
}

#[pymethods]
impl NormalizedTable {
    /// Asset identifiers in column order.
    #[getter]
    fn assets(&self) -> Vec<String> {
        self.inner.assets().to_vec()
    }

    /// Date axis as ISO-8601 strings.
    #[getter]
    fn dates(&self) -> Vec<String> {
        self.inner.dates().iter().map(iso).collect()
    }

    /// Volumes of one asset; unreadable cells are `None`.
    fn series(&self, asset: &str) -> PyResult<Vec<Option<f64>>> {
        liquidity_stats::numeric_series(&self.inner, asset, &Default::default())
            .map_err(to_py_err)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "NormalizedTable(assets={}, rows={})",
            self.inner.asset_count(),
            self.inner.len()
        )
    }
}

/// Descriptive statistics of one asset.
#[pyclass(frozen)]
#[derive(Clone)]
pub struct LiquiditySummary {
    #[pyo3(get)]
    pub asset: String,
    #[pyo3(get)]
    pub observations: usize,
    #[pyo3(get)]
    pub missing: usize,
    #[pyo3(get)]
    pub mean: f64,
    #[pyo3(get)]
    pub median: f64,
    #[pyo3(get)]
    pub std_dev: Option<f64>,
    #[pyo3(get)]
    pub mean_median_ratio: f64,
    #[pyo3(get)]
    pub period_start: Option<String>,
    #[pyo3(get)]
    pub period_end: Option<String>,
}

#[pymethods]
impl LiquiditySummary {
    fn __repr__(&self) -> String {
        format!(
            "LiquiditySummary(asset={}, mean={:.2}, median={:.2}, n={})",
            self.asset, self.mean, self.median, self.observations
        )
    }
}

impl From<RustLiquiditySummary> for LiquiditySummary {
    fn from(s: RustLiquiditySummary) -> Self {
        LiquiditySummary {
            asset: s.asset,
            observations: s.observations,
            missing: s.missing,
            mean: s.mean,
            median: s.median,
            std_dev: s.std_dev,
            mean_median_ratio: s.mean_median_ratio,
            period_start: s.period_start.as_ref().map(iso),
            period_end: s.period_end.as_ref().map(iso),
        }
    }
}

/// Two assets side by side.
#[pyclass(frozen)]
#[derive(Clone)]
pub struct LiquidityComparison {
    #[pyo3(get)]
    pub left: LiquiditySummary,
    #[pyo3(get)]
    pub right: LiquiditySummary,
    #[pyo3(get)]
    pub mean_ratio: f64,
    #[pyo3(get)]
    pub median_ratio: f64,
}

#[pymethods]
impl LiquidityComparison {
    fn __repr__(&self) -> String {
        format!(
            "LiquidityComparison({} vs {}, mean_ratio={:.3})",
            self.left.asset, self.right.asset, self.mean_ratio
        )
    }
}

impl From<RustLiquidityComparison> for LiquidityComparison {
    fn from(c: RustLiquidityComparison) -> Self {
        LiquidityComparison {
            left: c.left.into(),
            right: c.right.into(),
            mean_ratio: c.mean_ratio,
            median_ratio: c.median_ratio,
        }
    }
}

// ============================================================================
// Python-exposed Session
// ============================================================================

/// Configured pipeline with an upload cache in front of it.
#[pyclass]
pub struct LiquiditySession {
    cache: IngestCache,
    config: RustConfig,
}

#[pymethods]
impl LiquiditySession {
    /// Create a session, optionally from a JSON configuration document.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => RustConfig::from_json_str(json).map_err(to_py_err)?,
            None => RustConfig::default(),
        };
        let pipeline = Pipeline::new(&config).map_err(to_py_err)?;
        Ok(LiquiditySession {
            cache: IngestCache::new(pipeline, &config.cache),
            config,
        })
    }

    /// Ingest an upload, reusing the result for identical bytes.
    fn ingest(&mut self, file_name: &str, content: &[u8]) -> PyResult<NormalizedTable> {
        self.cache
            .ingest(file_name, content)
            .map(|inner| NormalizedTable { inner })
            .map_err(to_py_err)
    }

    /// Summarize one asset of a table.
    fn summarize(&self, table: &NormalizedTable, asset: &str) -> PyResult<LiquiditySummary> {
        liquidity_stats::summarize(&table.inner, asset, &self.config.stats)
            .map(Into::into)
            .map_err(to_py_err)
    }

    /// Summaries for every asset of a table.
    fn summarize_all(&self, table: &NormalizedTable) -> PyResult<Vec<LiquiditySummary>> {
        liquidity_stats::summarize_all(&table.inner, &self.config.stats)
            .map(|all| all.into_iter().map(Into::into).collect())
            .map_err(to_py_err)
    }

    /// Compare two different assets of a table.
    fn compare(
        &self,
        table: &NormalizedTable,
        left: &str,
        right: &str,
    ) -> PyResult<LiquidityComparison> {
        liquidity_stats::compare(&table.inner, left, right, &self.config.stats)
            .map(Into::into)
            .map_err(to_py_err)
    }

    /// Cache counters as `(hits, misses, entries)`.
    fn cache_stats(&self) -> (u64, u64, usize) {
        let s = self.cache.stats();
        (s.hits, s.misses, s.entries)
    }

    /// Drop every memoized upload.
    fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

// ============================================================================
// Module Functions
// ============================================================================

/// Install a tracing subscriber; returns False if one is already installed.
#[pyfunction]
#[pyo3(signature = (filter="info"))]
fn init_logging(filter: &str) -> PyResult<bool> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| PyValueError::new_err(format!("Config: invalid log filter: {e}")))?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok())
}

/// Ingest an upload with the default configuration.
#[pyfunction]
fn ingest(file_name: &str, content: &[u8]) -> PyResult<NormalizedTable> {
    liquidity_ingestion::ingest(file_name, content)
        .map(|table| NormalizedTable {
            inner: Arc::new(table),
        })
        .map_err(to_py_err)
}

// ============================================================================
// Module Definition
// ============================================================================

/// ETF liquidity core: upload ingestion and liquidity statistics.
#[pymodule]
fn etf_liquidity(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Functions
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(ingest, m)?)?;

    // Types
    m.add_class::<NormalizedTable>()?;
    m.add_class::<LiquiditySummary>()?;
    m.add_class::<LiquidityComparison>()?;

    // Session
    m.add_class::<LiquiditySession>()?;

    Ok(())
}
