//! Raw observation cells → numeric volumes.
//!
//! Normalization carries asset cells through untouched, so anything that
//! cannot be read as a volume becomes a missing value here rather than an
//! error.

use liquidity_core::{
    config::{DecimalSeparator, StatsConfig},
    parse_number, CellValue, Error, NormalizedTable, Result,
};

/// Read a cell as a volume.
///
/// Numbers pass through. Text is parsed in the convention given by
/// `decimal`; text that does not fit it is missing, as is everything else.
pub fn coerce_volume(cell: &CellValue, decimal: DecimalSeparator) -> Option<f64> {
    match cell {
        CellValue::Number(v) => Some(v.into_inner()).filter(|v| v.is_finite()),
        CellValue::Text(s) => {
            let (group, point) = match decimal {
                DecimalSeparator::Period => (',', '.'),
                DecimalSeparator::Comma => ('.', ','),
            };
            parse_number(&canonical_number(s.trim(), group, point)?)
        }
        CellValue::Null | CellValue::Bool(_) | CellValue::DateTime(_) => None,
    }
}

/// Rewrite `text` with a period decimal point and no grouping.
///
/// A grouping separator is accepted only between 3-digit groups of the
/// integer part (`1,234,567`); anywhere else the text is not a number in
/// this convention.
fn canonical_number(text: &str, group: char, point: char) -> Option<String> {
    let (int_part, frac) = match text.split_once(point) {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (text, None),
    };
    if frac.is_some_and(|f| f.contains(group) || f.contains(point)) {
        return None;
    }

    let digits = int_part.trim_start_matches(['-', '+']);
    if digits.contains(group) {
        let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
        let mut groups = digits.split(group);
        let lead_ok = groups
            .next()
            .is_some_and(|g| (1..=3).contains(&g.len()) && all_digits(g));
        if !lead_ok || !groups.all(|g| g.len() == 3 && all_digits(g)) {
            return None;
        }
    }

    let mut out = int_part.replace(group, "");
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    Some(out)
}

/// Volumes of one asset, aligned with the table's dates.
pub fn numeric_series(
    table: &NormalizedTable,
    asset: &str,
    config: &StatsConfig,
) -> Result<Vec<Option<f64>>> {
    let cells = table
        .observations(asset)
        .ok_or_else(|| Error::unknown_asset(asset))?;
    Ok(cells
        .iter()
        .map(|cell| coerce_volume(cell, config.decimal_separator))
        .collect())
}
