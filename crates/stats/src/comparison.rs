//! Two-asset liquidity comparison.

use crate::summary::{summarize, LiquiditySummary};
use liquidity_core::{config::StatsConfig, Error, NormalizedTable, Result};
use serde::{Deserialize, Serialize};

/// Side-by-side summaries plus relative liquidity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityComparison {
    pub left: LiquiditySummary,
    pub right: LiquiditySummary,
    /// `left.mean / right.mean`; 0 when the right mean is not positive.
    pub mean_ratio: f64,
    /// `left.median / right.median`; 0 when the right median is not positive.
    pub median_ratio: f64,
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Compare two distinct assets of the same table.
pub fn compare(
    table: &NormalizedTable,
    left: &str,
    right: &str,
    config: &StatsConfig,
) -> Result<LiquidityComparison> {
    if left == right {
        return Err(Error::SameAsset(left.to_string()));
    }
    let left = summarize(table, left, config)?;
    let right = summarize(table, right, config)?;

    Ok(LiquidityComparison {
        mean_ratio: ratio(left.mean, right.mean),
        median_ratio: ratio(left.median, right.median),
        left,
        right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use liquidity_core::{CellValue, ErrorKind};

    fn table() -> NormalizedTable {
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        NormalizedTable::from_parts(
            vec!["BOVA11".to_string(), "SMAL11".to_string()],
            vec![day(1), day(2)],
            vec![
                vec![CellValue::number(100.0), CellValue::number(300.0)],
                vec![CellValue::number(50.0), CellValue::number(50.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_compare() {
        let c = compare(&table(), "BOVA11", "SMAL11", &StatsConfig::default()).unwrap();
        assert_eq!(c.left.asset, "BOVA11");
        assert_eq!(c.right.asset, "SMAL11");
        assert_relative_eq!(c.mean_ratio, 4.0);
        assert_relative_eq!(c.median_ratio, 4.0);
    }

    #[test]
    fn test_same_asset_rejected() {
        let err = compare(&table(), "BOVA11", "BOVA11", &StatsConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SameAsset);
    }

    #[test]
    fn test_unknown_side() {
        let err = compare(&table(), "BOVA11", "IVVB11", &StatsConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAsset);
    }
}
