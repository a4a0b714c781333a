//! Raw table → normalized, time-ordered table.
//!
//! Steps, in order:
//! 1. rewrite every column label through the [`LabelExtractor`]
//! 2. resolve exactly one date column
//! 3. parse every date cell with one field order (one bad cell rejects the table)
//! 4. stable sort of rows by date
//! 5. require at least one asset column, resolving duplicate tickers
//!
//! Asset cells are carried through untouched; numeric coercion happens in
//! the statistics layer.

use crate::dates::DateParser;
use crate::ticker::{ExtractedLabel, LabelExtractor};
use liquidity_core::{
    config::{DuplicatePolicy, NormalizerConfig},
    CellValue, NormalizeError, NormalizedTable, RawTable, Result, DATE_MARKER,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Header, date-axis and ordering normalization.
#[derive(Debug, Default)]
pub struct Normalizer {
    extractor: LabelExtractor,
    dates: DateParser,
    duplicate_policy: DuplicatePolicy,
}

impl Normalizer {
    /// Create a normalizer from configuration.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        Ok(Self {
            extractor: LabelExtractor::new(config)?,
            dates: DateParser::new(config),
            duplicate_policy: config.duplicate_policy,
        })
    }

    /// Create a normalizer with a custom label extractor.
    pub fn with_extractor(extractor: LabelExtractor, config: &NormalizerConfig) -> Self {
        Self {
            extractor,
            dates: DateParser::new(config),
            duplicate_policy: config.duplicate_policy,
        }
    }

    pub fn extractor(&self) -> &LabelExtractor {
        &self.extractor
    }

    /// Normalize a raw table.
    pub fn normalize(&self, raw: &RawTable) -> std::result::Result<NormalizedTable, NormalizeError> {
        let labels = self.extractor.extract_all(raw.columns());
        let date_col = resolve_date_column(&labels)?;

        let cells: Vec<&CellValue> = raw.column(date_col).collect();
        let dates = match self.dates.parse_column(&cells) {
            Ok(dates) => dates,
            Err(err) => {
                warn!(%err, "unparseable date column");
                return Err(err);
            }
        };

        // sort_by_key is stable: equal dates keep source order
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        let asset_cols: Vec<(usize, String)> = labels
            .into_iter()
            .enumerate()
            .filter(|(_, label)| !label.is_date_marker())
            .map(|(i, label)| (i, label.into_label()))
            .collect();
        if asset_cols.is_empty() {
            return Err(NormalizeError::NoAssetColumns);
        }
        let asset_cols = self.resolve_duplicates(asset_cols)?;

        let sorted_dates = order.iter().map(|&i| dates[i]).collect();
        let rows = raw.rows();
        let observations = asset_cols
            .iter()
            .map(|(col, _)| order.iter().map(|&r| rows[r][*col].clone()).collect())
            .collect();
        let assets: Vec<String> = asset_cols.into_iter().map(|(_, name)| name).collect();

        debug!(
            assets = assets.len(),
            rows = order.len(),
            date_column = date_col,
            "normalized table"
        );

        Ok(NormalizedTable::from_parts(assets, sorted_dates, observations)
            .expect("observation columns are aligned with the sorted date axis"))
    }

    fn resolve_duplicates(
        &self,
        asset_cols: Vec<(usize, String)>,
    ) -> std::result::Result<Vec<(usize, String)>, NormalizeError> {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut used: HashSet<String> = asset_cols.iter().map(|(_, n)| n.clone()).collect();
        let mut resolved = Vec::with_capacity(asset_cols.len());

        for (col, name) in asset_cols {
            let Some(first) = first_seen.get(&name).copied() else {
                first_seen.insert(name.clone(), col);
                resolved.push((col, name));
                continue;
            };

            match self.duplicate_policy {
                DuplicatePolicy::Reject => {
                    warn!(asset = %name, first, second = col, "duplicate asset rejected");
                    return Err(NormalizeError::DuplicateAsset {
                        asset: name,
                        first,
                        second: col,
                    });
                }
                DuplicatePolicy::Disambiguate => {
                    let mut n = 2;
                    let renamed = loop {
                        let candidate = format!("{name}_{n}");
                        if !used.contains(&candidate) {
                            break candidate;
                        }
                        n += 1;
                    };
                    warn!(asset = %name, column = col, renamed = %renamed, "duplicate asset renamed");
                    used.insert(renamed.clone());
                    resolved.push((col, renamed));
                }
            }
        }

        Ok(resolved)
    }
}

fn resolve_date_column(labels: &[ExtractedLabel]) -> std::result::Result<usize, NormalizeError> {
    let date_cols: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_date_marker())
        .map(|(i, _)| i)
        .collect();

    match date_cols.as_slice() {
        [] => Err(NormalizeError::MissingDateColumn {
            marker: DATE_MARKER.to_string(),
        }),
        [only] => Ok(*only),
        _ => Err(NormalizeError::AmbiguousDateColumn {
            marker: DATE_MARKER.to_string(),
            columns: date_cols,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticker::{DateMarkerRule, LabelRule};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn raw(columns: &[&str], rows: &[&[CellValue]]) -> RawTable {
        RawTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter().map(|r| r.to_vec()).collect(),
        )
        .unwrap()
    }

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn n(v: f64) -> CellValue {
        CellValue::number(v)
    }

    #[test]
    fn test_normalizes_and_sorts() {
        let table = Normalizer::default()
            .normalize(&raw(
                &["COMDINHEIRO_BOVA11_VOL", " data ", "PETR4_AJUSTADO"],
                &[
                    &[n(3.0), t("2024-01-03"), n(30.0)],
                    &[n(1.0), t("2024-01-01"), n(10.0)],
                    &[n(2.0), t("2024-01-02"), t("n/a")],
                ],
            ))
            .unwrap();

        assert_eq!(table.assets(), &["BOVA11", "PETR4"]);
        assert_eq!(table.dates(), &[ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3)]);
        assert_eq!(table.observations("BOVA11").unwrap(), &[n(1.0), n(2.0), n(3.0)]);
        // non-numeric cells pass through untouched
        assert_eq!(table.observations("PETR4").unwrap()[1], t("n/a"));
    }

    #[test]
    fn test_equal_dates_keep_source_order() {
        let table = Normalizer::default()
            .normalize(&raw(
                &["Data", "BOVA11"],
                &[
                    &[t("2024-01-02"), n(1.0)],
                    &[t("2024-01-01"), n(2.0)],
                    &[t("2024-01-02"), n(3.0)],
                    &[t("2024-01-01"), n(4.0)],
                ],
            ))
            .unwrap();
        assert_eq!(
            table.observations("BOVA11").unwrap(),
            &[n(2.0), n(4.0), n(1.0), n(3.0)]
        );
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_missing_date_column() {
        let err = Normalizer::default()
            .normalize(&raw(&["BOVA11", "SMAL11"], &[&[n(1.0), n(2.0)]]))
            .unwrap_err();
        assert!(matches!(err, NormalizeError::MissingDateColumn { .. }));
    }

    #[test]
    fn test_ambiguous_date_column() {
        let err = Normalizer::default()
            .normalize(&raw(
                &["Data", "BOVA11", "DATA "],
                &[&[t("2024-01-01"), n(1.0), t("2024-01-01")]],
            ))
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::AmbiguousDateColumn {
                marker: "Data".to_string(),
                columns: vec![0, 2],
            }
        );
    }

    #[test]
    fn test_invalid_date_rejects_whole_table() {
        let err = Normalizer::default()
            .normalize(&raw(
                &["Data", "BOVA11"],
                &[
                    &[t("2024-01-01"), n(1.0)],
                    &[t("soon"), n(2.0)],
                    &[CellValue::Null, n(3.0)],
                ],
            ))
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidDateValue {
                row: 1,
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_only_date_column() {
        let err = Normalizer::default()
            .normalize(&raw(&["Data"], &[&[t("2024-01-01")]]))
            .unwrap_err();
        assert_eq!(err, NormalizeError::NoAssetColumns);
    }

    #[test]
    fn test_unmatched_columns_survive() {
        let table = Normalizer::default()
            .normalize(&raw(&["Data", "Unnamed: 1"], &[&[t("2024-01-01"), n(5.0)]]))
            .unwrap();
        assert_eq!(table.assets(), &["Unnamed: 1"]);
    }

    #[test]
    fn test_duplicates_disambiguated() {
        let table = Normalizer::default()
            .normalize(&raw(
                &["Data", "BOVA11_VOL", "X_BOVA11", "BOVA11_2"],
                &[&[t("2024-01-01"), n(1.0), n(2.0), n(3.0)]],
            ))
            .unwrap();
        assert_eq!(table.assets(), &["BOVA11", "BOVA11_2", "BOVA11_3"]);
        assert_eq!(table.observations("BOVA11_3").unwrap(), &[n(3.0)]);
    }

    #[test]
    fn test_duplicates_rejected() {
        let normalizer = Normalizer::new(&NormalizerConfig {
            duplicate_policy: DuplicatePolicy::Reject,
            ..NormalizerConfig::default()
        })
        .unwrap();
        let err = normalizer
            .normalize(&raw(
                &["Data", "BOVA11_VOL", "X_BOVA11"],
                &[&[t("2024-01-01"), n(1.0), n(2.0)]],
            ))
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::DuplicateAsset {
                asset: "BOVA11".to_string(),
                first: 1,
                second: 2,
            }
        );
    }

    #[test]
    fn test_empty_body_is_valid() {
        let table = Normalizer::default()
            .normalize(&raw(&["Data", "BOVA11"], &[]))
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.assets(), &["BOVA11"]);
    }

    #[test]
    fn test_renormalizing_is_idempotent() {
        let normalizer = Normalizer::default();
        let first = normalizer
            .normalize(&raw(
                &["PETR4_AJUSTADO", "Data", "BOVA11_VOL", "X_BOVA11"],
                &[
                    &[n(2.0), t("02/01/2024"), n(20.0), n(200.0)],
                    &[n(1.0), t("01/01/2024"), n(10.0), n(100.0)],
                ],
            ))
            .unwrap();
        let second = normalizer.normalize(&first.to_raw()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_day_first_column_is_not_mixed() {
        let table = Normalizer::default()
            .normalize(&raw(
                &["Data", "BOVA11"],
                &[
                    &[t("14/01/2024"), n(14.0)],
                    &[t("12/01/2024"), n(12.0)],
                    &[t("13/01/2024"), n(13.0)],
                ],
            ))
            .unwrap();
        assert_eq!(table.dates(), &[ymd(2024, 1, 12), ymd(2024, 1, 13), ymd(2024, 1, 14)]);
        assert_eq!(
            table.observations("BOVA11").unwrap(),
            &[n(12.0), n(13.0), n(14.0)]
        );
    }

    #[test]
    fn test_custom_rules() {
        struct Prefix;

        impl LabelRule for Prefix {
            fn name(&self) -> &'static str {
                "prefix"
            }

            fn apply(&self, trimmed: &str) -> Option<ExtractedLabel> {
                trimmed
                    .strip_prefix("vol_")
                    .map(|t| ExtractedLabel::Ticker(t.to_uppercase()))
            }
        }

        let extractor = LabelExtractor::with_rules(vec![
            Box::new(DateMarkerRule::new("data")),
            Box::new(Prefix),
        ]);
        let normalizer = Normalizer::with_extractor(extractor, &NormalizerConfig::default());
        assert_eq!(normalizer.extractor().rule_names(), vec!["date-marker", "prefix"]);

        let table = normalizer
            .normalize(&raw(&["Data", "vol_ivvb11"], &[&[t("2024-01-01"), n(1.0)]]))
            .unwrap();
        assert_eq!(table.assets(), &["IVVB11"]);
    }
}
