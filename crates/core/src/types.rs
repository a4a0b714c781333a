//! Core data types for the ETF liquidity workspace.

use crate::error::LoadError;
use chrono::NaiveDateTime;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical label of the time-axis column after normalization.
pub const DATE_MARKER: &str = "Data";

/// Parse a decimal number written with a period separator.
///
/// Rejects `inf`/`NaN` spellings and anything non-finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single raw scalar from an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Create a numeric cell.
    #[inline]
    pub fn number(value: f64) -> Self {
        CellValue::Number(OrderedFloat(value))
    }

    /// Create a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Type-infer a cell read from a text format.
    ///
    /// Blank → `Null`, numeric → `Number`, anything else is kept verbatim.
    pub fn infer(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return CellValue::Null;
        }
        match parse_number(raw) {
            Some(v) => CellValue::number(v),
            None => CellValue::Text(raw.to_string()),
        }
    }

    /// Numeric value, if this is a number cell.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(v.into_inner()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(v) => write!(f, "{}", v.into_inner()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::number(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

/// Unnormalized table as read from an uploaded file.
///
/// Cells are stored positionally since labels may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Create a table, checking every row against the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, LoadError> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(LoadError::malformed(format!(
                "row {} has {} cells but the header has {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Column labels in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in source order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }
}

/// Clean, time-ordered table handed to the statistics layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTable {
    assets: Vec<String>,
    dates: Vec<NaiveDateTime>,
    /// One column per asset, aligned with `dates`.
    observations: Vec<Vec<CellValue>>,
}

impl NormalizedTable {
    /// Assemble a table from its parts.
    ///
    /// Returns `None` unless there is one observation column per asset, every
    /// column has one cell per date, and dates are non-decreasing.
    pub fn from_parts(
        assets: Vec<String>,
        dates: Vec<NaiveDateTime>,
        observations: Vec<Vec<CellValue>>,
    ) -> Option<Self> {
        if assets.len() != observations.len()
            || observations.iter().any(|col| col.len() != dates.len())
            || dates.windows(2).any(|w| w[0] > w[1])
        {
            return None;
        }
        Some(Self {
            assets,
            dates,
            observations,
        })
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Date axis, ascending.
    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    /// Position of an asset, first match.
    pub fn asset_index(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Observations for an asset, aligned with `dates()`.
    pub fn observations(&self, asset: &str) -> Option<&[CellValue]> {
        self.asset_index(asset).map(|i| self.observations[i].as_slice())
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// First and last date, if any rows exist.
    pub fn period(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Convert back into a raw table: date marker column first, then assets.
    pub fn to_raw(&self) -> RawTable {
        let mut columns = Vec::with_capacity(self.assets.len() + 1);
        columns.push(DATE_MARKER.to_string());
        columns.extend(self.assets.iter().cloned());

        let rows = self
            .dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let mut row = Vec::with_capacity(columns.len());
                row.push(CellValue::DateTime(*date));
                row.extend(self.observations.iter().map(|col| col[i].clone()));
                row
            })
            .collect();

        RawTable { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_cell_inference() {
        assert_eq!(CellValue::infer("1000"), CellValue::number(1000.0));
        assert_eq!(CellValue::infer(" -2.5 "), CellValue::number(-2.5));
        assert_eq!(CellValue::infer("1e3"), CellValue::number(1000.0));
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("   "), CellValue::Null);
        assert_eq!(CellValue::infer("NaN"), CellValue::text("NaN"));
        assert_eq!(CellValue::infer("1.234,56"), CellValue::text("1.234,56"));
        assert_eq!(CellValue::infer("2024-01-01"), CellValue::text("2024-01-01"));
    }

    #[test]
    fn test_raw_table_rejects_ragged_rows() {
        let result = RawTable::new(
            vec!["Data".into(), "BOVA11".into()],
            vec![vec![CellValue::text("2024-01-01")]],
        );
        assert!(matches!(result, Err(LoadError::MalformedInput { .. })));
    }

    #[test]
    fn test_raw_table_column_access() {
        let table = RawTable::new(
            vec!["Data".into(), "BOVA11".into()],
            vec![
                vec![CellValue::text("2024-01-01"), CellValue::number(1.0)],
                vec![CellValue::text("2024-01-02"), CellValue::number(2.0)],
            ],
        )
        .unwrap();
        let col: Vec<f64> = table.column(1).filter_map(CellValue::as_f64).collect();
        assert_eq!(col, vec![1.0, 2.0]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_normalized_table_invariants() {
        assert!(NormalizedTable::from_parts(
            vec!["BOVA11".into()],
            vec![day(2), day(1)],
            vec![vec![CellValue::Null, CellValue::Null]],
        )
        .is_none());

        assert!(NormalizedTable::from_parts(
            vec!["BOVA11".into()],
            vec![day(1), day(2)],
            vec![vec![CellValue::Null]],
        )
        .is_none());

        let table = NormalizedTable::from_parts(
            vec!["BOVA11".into()],
            vec![day(1), day(1), day(3)],
            vec![vec![1.0.into(), 2.0.into(), 3.0.into()]],
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.period(), Some((day(1), day(3))));
        assert_eq!(table.observations("BOVA11").unwrap().len(), 3);
        assert!(table.observations("SMAL11").is_none());
    }

    #[test]
    fn test_to_raw_puts_date_first() {
        let table = NormalizedTable::from_parts(
            vec!["BOVA11".into(), "SMAL11".into()],
            vec![day(1)],
            vec![vec![10.0.into()], vec![20.0.into()]],
        )
        .unwrap();
        let raw = table.to_raw();
        assert_eq!(raw.columns(), &["Data", "BOVA11", "SMAL11"]);
        assert_eq!(raw.rows()[0][0], CellValue::DateTime(day(1)));
        assert_eq!(raw.rows()[0][2], CellValue::number(20.0));
    }
}
