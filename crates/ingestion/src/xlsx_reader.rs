//! Spreadsheet reader for `.xlsx` workbooks.

use crate::strategy::{header_label, ParseStrategy};
use calamine::{Data, Reader, Xlsx};
use liquidity_core::{CellValue, RawTable};
use std::io::Cursor;

/// Reads the first worksheet; its first row is the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spreadsheet;

impl ParseStrategy for Spreadsheet {
    fn name(&self) -> String {
        "xlsx".to_string()
    }

    fn parse(&self, content: &[u8]) -> Result<RawTable, String> {
        let mut workbook: Xlsx<_> =
            Xlsx::new(Cursor::new(content)).map_err(|e| e.to_string())?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| "workbook has no worksheets".to_string())?
            .map_err(|e| e.to_string())?;

        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| "first worksheet is empty".to_string())?;

        let columns = header
            .iter()
            .enumerate()
            .map(|(i, cell)| header_label(&header_text(cell), i))
            .collect();

        let data = rows
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        RawTable::new(columns, data).map_err(|e| e.to_string())
    }
}

/// Header cells may be typed; integral numbers lose their `.0`.
fn header_text(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::number(*i as f64),
        Data::Float(f) => CellValue::number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}
