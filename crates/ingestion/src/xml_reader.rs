//! Tree-markup reader for shallow, record-per-row XML.
//!
//! Every element child of the document root is one row. A row's attributes
//! and the text of its direct child elements are its columns; the column set
//! is the union over all rows in first-seen order.

use crate::strategy::{header_label, strip_bom, ParseStrategy};
use liquidity_core::{CellValue, RawTable};
use std::collections::HashMap;

/// Flattens `<root><row a="..."><col>..</col></row>...</root>` into a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordMarkup;

impl ParseStrategy for RecordMarkup {
    fn name(&self) -> String {
        "xml".to_string()
    }

    fn parse(&self, content: &[u8]) -> Result<RawTable, String> {
        let text = std::str::from_utf8(strip_bom(content))
            .map_err(|e| format!("invalid UTF-8: {e}"))?;
        let doc = roxmltree::Document::parse(text).map_err(|e| e.to_string())?;

        let records: Vec<_> = doc
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .collect();
        if records.is_empty() {
            return Err(format!(
                "root element <{}> has no record elements",
                doc.root_element().tag_name().name()
            ));
        }

        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut sparse_rows = Vec::with_capacity(records.len());

        let mut column_for = |name: &str, columns: &mut Vec<String>| -> usize {
            *index.entry(name.to_string()).or_insert_with(|| {
                columns.push(name.to_string());
                columns.len() - 1
            })
        };

        for (row_idx, record) in records.iter().enumerate() {
            let mut cells = Vec::new();

            for attr in record.attributes() {
                let col = column_for(attr.name(), &mut columns);
                cells.push((col, CellValue::infer(attr.value())));
            }

            for child in record.children().filter(|n| n.is_element()) {
                if child.children().any(|n| n.is_element()) {
                    return Err(format!(
                        "record {} has nested element <{}>; only flat records are supported",
                        row_idx,
                        child.tag_name().name()
                    ));
                }
                let col = column_for(child.tag_name().name(), &mut columns);
                cells.push((col, CellValue::infer(child.text().unwrap_or_default())));
            }

            sparse_rows.push(cells);
        }

        if columns.is_empty() {
            return Err("records carry no attributes or child elements".to_string());
        }

        let rows = sparse_rows
            .into_iter()
            .map(|cells| {
                let mut row = vec![CellValue::Null; columns.len()];
                for (col, value) in cells {
                    row[col] = value;
                }
                row
            })
            .collect();

        let columns = columns
            .iter()
            .enumerate()
            .map(|(i, c)| header_label(c, i))
            .collect();

        RawTable::new(columns, rows).map_err(|e| e.to_string())
    }
}
