//! Delimited-text reader.
//!
//! Exports arrive with either comma or semicolon delimiters depending on the
//! regional settings of the system that produced them, so one strategy is
//! built per candidate delimiter and tried in order.

use crate::strategy::{header_label, strip_bom, ParseStrategy};
use csv::ReaderBuilder;
use liquidity_core::{CellValue, RawTable};

/// Parses delimited text with a single delimiter.
#[derive(Debug, Clone)]
pub struct DelimitedText {
    delimiter: u8,
    /// Delimiters that, found inside a lone header field, mean this one is wrong.
    alternatives: Vec<u8>,
}

impl DelimitedText {
    pub fn new(delimiter: u8, alternatives: Vec<u8>) -> Self {
        Self {
            delimiter,
            alternatives,
        }
    }

    /// One strategy per delimiter, in order.
    pub fn chain(delimiters: &[u8]) -> Vec<DelimitedText> {
        delimiters
            .iter()
            .enumerate()
            .map(|(i, &d)| DelimitedText::new(d, delimiters[i + 1..].to_vec()))
            .collect()
    }
}

impl ParseStrategy for DelimitedText {
    fn name(&self) -> String {
        format!("csv[{}]", char::from(self.delimiter))
    }

    fn parse(&self, content: &[u8]) -> Result<RawTable, String> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(strip_bom(content));

        let headers = reader.headers().map_err(|e| e.to_string())?.clone();
        if headers.is_empty() {
            return Err("no header row".to_string());
        }

        // A header that did not split at all but contains another candidate
        // delimiter was written with that other delimiter.
        if headers.len() == 1 {
            let only = headers.get(0).unwrap_or_default();
            if let Some(&alt) = self
                .alternatives
                .iter()
                .find(|&&alt| only.as_bytes().contains(&alt))
            {
                return Err(format!(
                    "header did not split on '{}' but contains '{}'",
                    char::from(self.delimiter),
                    char::from(alt)
                ));
            }
        }

        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| header_label(h, i))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            rows.push(record.iter().map(CellValue::infer).collect());
        }

        RawTable::new(columns, rows).map_err(|e| e.to_string())
    }
}
