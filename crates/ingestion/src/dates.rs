//! Permissive date parsing for the time-axis column.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use liquidity_core::{config::NormalizerConfig, parse_number, CellValue, NormalizeError};
use tracing::debug;

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const MONTH_FIRST_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];
const DAY_FIRST_DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
const DAY_FIRST_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d-%b-%Y",  // 15-Jan-2024
    "%d %b %Y",  // 15 Jan 2024
    "%b %d, %Y", // Jan 15, 2024
    "%d %B %Y",  // 15 January 2024
    "%B %d, %Y", // January 15, 2024
];

/// Last day representable as a spreadsheet serial (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Field order for ambiguous `a/b/yyyy` dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

impl FieldOrder {
    pub fn other(self) -> Self {
        match self {
            FieldOrder::MonthFirst => FieldOrder::DayFirst,
            FieldOrder::DayFirst => FieldOrder::MonthFirst,
        }
    }

    fn datetime_formats(self) -> &'static [&'static str] {
        match self {
            FieldOrder::MonthFirst => MONTH_FIRST_DATETIME_FORMATS,
            FieldOrder::DayFirst => DAY_FIRST_DATETIME_FORMATS,
        }
    }

    fn date_formats(self) -> &'static [&'static str] {
        match self {
            FieldOrder::MonthFirst => MONTH_FIRST_DATE_FORMATS,
            FieldOrder::DayFirst => DAY_FIRST_DATE_FORMATS,
        }
    }
}

/// Converts date-column cells into timestamps.
#[derive(Debug, Clone, Default)]
pub struct DateParser {
    preferred: FieldOrder,
    custom_formats: Vec<String>,
}

impl DateParser {
    pub fn new(config: &NormalizerConfig) -> Self {
        let preferred = if config.day_first {
            FieldOrder::DayFirst
        } else {
            FieldOrder::MonthFirst
        };
        Self {
            preferred,
            custom_formats: config.date_formats.clone(),
        }
    }

    pub fn preferred(&self) -> FieldOrder {
        self.preferred
    }

    /// Parse a whole date column with one field order.
    ///
    /// The preferred order is tried on every cell; the other order is used
    /// only if it reads every cell. Orders are never mixed within a column.
    /// On failure the first cell the preferred order could not read is
    /// reported.
    pub fn parse_column(&self, cells: &[&CellValue]) -> Result<Vec<NaiveDateTime>, NormalizeError> {
        let failed_row = match self.parse_all(cells, self.preferred) {
            Ok(dates) => return Ok(dates),
            Err(row) => row,
        };

        let other = self.preferred.other();
        if let Ok(dates) = self.parse_all(cells, other) {
            debug!(order = ?other, "date column read with the non-preferred field order");
            return Ok(dates);
        }

        Err(NormalizeError::InvalidDateValue {
            row: failed_row,
            value: cells[failed_row].to_string(),
        })
    }

    fn parse_all(&self, cells: &[&CellValue], order: FieldOrder) -> Result<Vec<NaiveDateTime>, usize> {
        cells
            .iter()
            .enumerate()
            .map(|(row, cell)| self.parse_cell_as(cell, order).ok_or(row))
            .collect()
    }

    /// Parse one cell with the preferred field order.
    pub fn parse_cell(&self, cell: &CellValue) -> Option<NaiveDateTime> {
        self.parse_cell_as(cell, self.preferred)
    }

    fn parse_cell_as(&self, cell: &CellValue, order: FieldOrder) -> Option<NaiveDateTime> {
        match cell {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(s) => self.parse_str_as(s, order),
            CellValue::Number(n) => from_number(n.into_inner()),
            CellValue::Null | CellValue::Bool(_) => None,
        }
    }

    /// Parse a date string with the preferred field order.
    pub fn parse_str(&self, raw: &str) -> Option<NaiveDateTime> {
        self.parse_str_as(raw, self.preferred)
    }

    /// Parse a date string, trying the most specific forms first.
    fn parse_str_as(&self, raw: &str, order: FieldOrder) -> Option<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        for fmt in &self.custom_formats {
            if let Some(dt) = try_format(s, fmt) {
                return Some(dt);
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }

        let ordered = ISO_DATETIME_FORMATS
            .iter()
            .chain(ISO_DATE_FORMATS)
            .chain(order.datetime_formats())
            .chain(order.date_formats())
            .chain(NAMED_MONTH_FORMATS);

        for fmt in ordered {
            if let Some(dt) = try_format(s, fmt) {
                return Some(dt);
            }
        }

        parse_compact(s).or_else(|| parse_number(s).and_then(from_number))
    }
}

fn try_format(s: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, fmt)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, fmt).ok().map(midnight))
}

#[inline]
fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// `YYYYMMDD` with no separators.
fn parse_compact(s: &str) -> Option<NaiveDateTime> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(midnight)
}

/// Numeric date cells: compact `YYYYMMDD` integers, else spreadsheet serials.
fn from_number(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && (10_000_101.0..=99_991_231.0).contains(&value) {
        return parse_compact(&format!("{}", value as i64));
    }
    if !(1.0..MAX_SERIAL + 1.0).contains(&value) {
        return None;
    }
    // 1899-12-30 absorbs the 1900 leap-year bug for every serial after February 1900.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).map(midnight)?;
    let millis = (value * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
