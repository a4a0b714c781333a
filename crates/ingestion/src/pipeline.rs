//! Load-then-normalize composition.

use crate::loader::Loader;
use crate::normalizer::Normalizer;
use liquidity_core::{Config, IngestError, NormalizedTable, RawTable, Result};
use tracing::info;

/// The full ingestion pipeline for one upload.
#[derive(Debug, Default)]
pub struct Pipeline {
    loader: Loader,
    normalizer: Normalizer,
}

impl Pipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            loader: Loader::new(&config.loader),
            normalizer: Normalizer::new(&config.normalizer)?,
        })
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Load and normalize; any failure aborts the whole upload.
    pub fn ingest(
        &self,
        file_name: &str,
        content: &[u8],
    ) -> std::result::Result<NormalizedTable, IngestError> {
        let raw = self.loader.load(file_name, content)?;
        let table = self.normalizer.normalize(&raw)?;
        info!(
            file_name,
            assets = table.asset_count(),
            rows = table.len(),
            "upload ingested"
        );
        Ok(table)
    }
}

/// Load and normalize with the default configuration.
pub fn ingest(file_name: &str, content: &[u8]) -> std::result::Result<NormalizedTable, IngestError> {
    Pipeline::default().ingest(file_name, content)
}

/// Normalize a raw table with the default configuration.
pub fn normalize(raw: &RawTable) -> std::result::Result<NormalizedTable, liquidity_core::NormalizeError> {
    Normalizer::default().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx_reader::tests::build_xlsx;
    use liquidity_core::{CellValue, ErrorKind};

    #[test]
    fn test_csv_end_to_end() {
        let table = ingest(
            "liquidez.csv",
            b"Data;COMDINHEIRO_BOVA11_VOL;SMAL11 volume\n2024-01-02;2000;20\n2024-01-01;1000;10\n",
        )
        .unwrap();
        assert_eq!(table.assets(), &["BOVA11", "SMAL11"]);
        assert_eq!(
            table.observations("BOVA11").unwrap(),
            &[CellValue::number(1000.0), CellValue::number(2000.0)]
        );
    }

    #[test]
    fn test_xml_end_to_end() {
        let xml = br#"<data>
            <row><Data>01/03/2024</Data><IVVB11_FIN>5</IVVB11_FIN></row>
            <row><Data>01/02/2024</Data><IVVB11_FIN>4</IVVB11_FIN></row>
        </data>"#;
        let table = ingest("feed.xml", xml).unwrap();
        assert_eq!(table.assets(), &["IVVB11"]);
        assert!(table.dates()[0] < table.dates()[1]);
    }

    #[test]
    fn test_xlsx_sorted_by_date_cells() {
        let bytes = build_xlsx(&[
            &["Data", "COMDINHEIRO_BOVA11_VOL"],
            &["date:45294", "3000"],
            &["date:45292", "1000"],
            &["date:45293", "2000"],
        ]);
        let table = ingest("x.xlsx", &bytes).unwrap();
        let days: Vec<String> = table
            .dates()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(days, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(
            table.observations("BOVA11").unwrap(),
            &[
                CellValue::number(1000.0),
                CellValue::number(2000.0),
                CellValue::number(3000.0)
            ]
        );
    }

    #[test]
    fn test_errors_carry_kind() {
        let err = ingest("notes.txt", b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

        let err = ingest("v.csv", b"BOVA11,SMAL11\n1,2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingDateColumn);

        let err = ingest("v.csv", b"Data\n2024-01-01").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoAssetColumns);

        let err = ingest("v.csv", b"Data,BOVA11\nyesterday,1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDateValue);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.normalizer.ticker_pattern = "(".to_string();
        assert!(Pipeline::new(&config).is_err());
    }
}
