//! File format detection by name suffix.

use liquidity_core::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    /// Office Open XML spreadsheet.
    Xlsx,
    /// Delimited text.
    Csv,
    /// Record-per-row markup.
    Xml,
}

impl FileFormat {
    /// Pick the format from the file-name suffix, case-insensitively.
    ///
    /// Content is never inspected.
    pub fn detect(file_name: &str) -> Result<Self, LoadError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if ext.eq_ignore_ascii_case("xlsx") {
            Ok(FileFormat::Xlsx)
        } else if ext.eq_ignore_ascii_case("csv") {
            Ok(FileFormat::Csv)
        } else if ext.eq_ignore_ascii_case("xml") {
            Ok(FileFormat::Xml)
        } else {
            Err(LoadError::unsupported_format(file_name))
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Xlsx => "xlsx",
            FileFormat::Csv => "csv",
            FileFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
