//! Configuration structures for the ETF liquidity workspace.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for ingestion and statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File loading configuration.
    pub loader: LoaderConfig,
    /// Header and date-axis normalization configuration.
    pub normalizer: NormalizerConfig,
    /// Statistics configuration.
    pub stats: StatsConfig,
    /// Ingest cache configuration.
    pub cache: CacheConfig,
}

impl Config {
    /// Parse a JSON document; missing sections and fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.loader.csv_delimiters.is_empty() {
            return Err(Error::config("loader.csv_delimiters must not be empty"));
        }
        if let Some(d) = self.loader.csv_delimiters.iter().find(|d| !d.is_ascii()) {
            return Err(Error::config(format!(
                "loader.csv_delimiters: '{d}' is not a single-byte delimiter"
            )));
        }
        if self.normalizer.date_token.trim().is_empty() {
            return Err(Error::config("normalizer.date_token must not be blank"));
        }
        if self.normalizer.ticker_pattern.is_empty() {
            return Err(Error::config("normalizer.ticker_pattern must not be empty"));
        }
        if self.stats.min_observations == 0 {
            return Err(Error::config("stats.min_observations must be at least 1"));
        }
        if self.cache.max_entries == 0 {
            return Err(Error::config("cache.max_entries must be at least 1"));
        }
        Ok(())
    }
}

/// File loading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Delimiters tried in order for delimited text.
    pub csv_delimiters: Vec<char>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            csv_delimiters: vec![',', ';'],
        }
    }
}

/// What to do when two source columns reduce to the same ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first as-is, rename later ones `BOVA11_2`, `BOVA11_3`, ...
    #[default]
    Disambiguate,
    /// Fail normalization.
    Reject,
}

/// Header and date-axis normalization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Header token (compared trimmed and case-folded) that marks the date column.
    pub date_token: String,
    /// Pattern whose first match in a header becomes the asset identifier.
    pub ticker_pattern: String,
    /// Collision handling for extracted tickers.
    pub duplicate_policy: DuplicatePolicy,
    /// Read ambiguous `a/b/yyyy` dates as day/month.
    pub day_first: bool,
    /// Extra chrono formats tried before the built-in ones.
    pub date_formats: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            date_token: "data".to_string(),
            ticker_pattern: "[A-Z]{4}[0-9]{1,2}".to_string(),
            duplicate_policy: DuplicatePolicy::Disambiguate,
            day_first: false,
            date_formats: Vec::new(),
        }
    }
}

/// Decimal convention used when coercing text volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalSeparator {
    /// `1,234.56`
    #[default]
    Period,
    /// `1.234,56`
    Comma,
}

/// Statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Decimal convention for text cells.
    pub decimal_separator: DecimalSeparator,
    /// Minimum numeric observations for a summary.
    pub min_observations: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            decimal_separator: DecimalSeparator::Period,
            min_observations: 1,
        }
    }
}

/// Ingest cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum memoized uploads; the oldest is evicted first.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.loader.csv_delimiters, vec![',', ';']);
        assert_eq!(config.normalizer.date_token, "data");
        assert_eq!(config.normalizer.duplicate_policy, DuplicatePolicy::Disambiguate);
        assert_eq!(config.stats.decimal_separator, DecimalSeparator::Period);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(
            r#"{"normalizer": {"duplicate_policy": "reject", "day_first": true},
                "stats": {"decimal_separator": "comma"}}"#,
        )
        .unwrap();
        assert_eq!(config.normalizer.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.normalizer.day_first);
        assert_eq!(config.normalizer.date_token, "data");
        assert_eq!(config.stats.decimal_separator, DecimalSeparator::Comma);
        assert_eq!(config.cache.max_entries, 32);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Config::from_json_str(r#"{"loader": {"csv_delimiters": []}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_json_str(r#"{"cache": {"max_entries": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_json_str("not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
