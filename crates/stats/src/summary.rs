//! Per-asset liquidity summaries.

use crate::coerce::numeric_series;
use chrono::NaiveDateTime;
use liquidity_core::{config::StatsConfig, Error, NormalizedTable, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};
use tracing::debug;

/// Descriptive statistics of one asset's traded volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySummary {
    pub asset: String,
    /// Numeric observations used.
    pub observations: usize,
    /// Cells that could not be read as a volume.
    pub missing: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` below two observations.
    pub std_dev: Option<f64>,
    /// `mean / median`, or 0 when the median is not positive.
    pub mean_median_ratio: f64,
    pub period_start: Option<NaiveDateTime>,
    pub period_end: Option<NaiveDateTime>,
}

/// Summarize one asset.
pub fn summarize(
    table: &NormalizedTable,
    asset: &str,
    config: &StatsConfig,
) -> Result<LiquiditySummary> {
    let series = numeric_series(table, asset, config)?;
    let values: Vec<f64> = series.iter().flatten().copied().collect();
    let missing = series.len() - values.len();

    if values.is_empty() || values.len() < config.min_observations {
        return Err(Error::insufficient_data(format!(
            "{asset} has {} numeric observations, need {}",
            values.len(),
            config.min_observations.max(1)
        )));
    }

    let mean = values.iter().mean();
    let median = Data::new(values.clone()).median();
    let std_dev = (values.len() >= 2).then(|| values.iter().std_dev());
    let mean_median_ratio = if median > 0.0 { mean / median } else { 0.0 };
    let (period_start, period_end) = table.period().unzip();

    debug!(asset, observations = values.len(), missing, mean, median, "summarized asset");

    Ok(LiquiditySummary {
        asset: asset.to_string(),
        observations: values.len(),
        missing,
        mean,
        median,
        std_dev,
        mean_median_ratio,
        period_start,
        period_end,
    })
}

/// Summaries for every asset, in table order.
pub fn summarize_all(
    table: &NormalizedTable,
    config: &StatsConfig,
) -> Result<Vec<LiquiditySummary>> {
    table
        .assets()
        .iter()
        .map(|asset| summarize(table, asset, config))
        .collect()
}
