//! Format detection and loading of uploads into raw tables.

use crate::csv_reader::DelimitedText;
use crate::format::FileFormat;
use crate::strategy::{run_strategies, ParseStrategy};
use crate::xlsx_reader::Spreadsheet;
use crate::xml_reader::RecordMarkup;
use liquidity_core::{config::LoaderConfig, LoadError, RawTable};
use tracing::{debug, info};

/// Selects a parse strategy by file suffix and reads the upload.
#[derive(Debug, Clone)]
pub struct Loader {
    delimiters: Vec<u8>,
}

impl Loader {
    /// Create a loader from configuration.
    ///
    /// Multi-byte delimiters are skipped; `Config::validate` reports them.
    pub fn new(config: &LoaderConfig) -> Self {
        let delimiters = config
            .csv_delimiters
            .iter()
            .filter(|c| c.is_ascii())
            .map(|&c| c as u8)
            .collect();
        Self { delimiters }
    }

    /// Strategies tried, in order, for a format.
    pub fn strategies(&self, format: FileFormat) -> Vec<Box<dyn ParseStrategy>> {
        match format {
            FileFormat::Xlsx => vec![Box::new(Spreadsheet)],
            FileFormat::Xml => vec![Box::new(RecordMarkup)],
            FileFormat::Csv => DelimitedText::chain(&self.delimiters)
                .into_iter()
                .map(|s| Box::new(s) as Box<dyn ParseStrategy>)
                .collect(),
        }
    }

    /// Load an upload into a raw table.
    pub fn load(&self, file_name: &str, content: &[u8]) -> Result<RawTable, LoadError> {
        let format = FileFormat::detect(file_name)?;
        info!(file_name, %format, bytes = content.len(), "loading upload");

        let table = run_strategies(&self.strategies(format), content)?;
        debug!(
            columns = table.column_count(),
            rows = table.row_count(),
            "loaded raw table"
        );
        Ok(table)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(&LoaderConfig::default())
    }
}

/// Load with the default configuration.
pub fn load(file_name: &str, content: &[u8]) -> Result<RawTable, LoadError> {
    Loader::default().load(file_name, content)
}
