//! Header cleanup: canonical asset tickers from noisy column labels.
//!
//! Vendor exports decorate tickers with prefixes and suffixes
//! (`COMDINHEIRO_BOVA11_VOL`, `PETR4_AJUSTADO`). Labels go through an ordered
//! list of rules, exact-match rules first; the first rule that matches decides
//! the label. A label no rule matches is kept verbatim so it still shows up
//! downstream, visibly un-cleaned.

use liquidity_core::{config::NormalizerConfig, Error, Result, DATE_MARKER};
use regex::Regex;
use tracing::trace;

/// Default ticker shape: four uppercase letters, then one or two digits.
pub const DEFAULT_TICKER_PATTERN: &str = "[A-Z]{4}[0-9]{1,2}";

/// Outcome of running one label through the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedLabel {
    /// The time-axis column.
    DateMarker,
    /// A ticker found inside the label.
    Ticker(String),
    /// No rule matched; the original label, untrimmed.
    Unmatched(String),
}

impl ExtractedLabel {
    /// Label after rewriting.
    pub fn label(&self) -> &str {
        match self {
            ExtractedLabel::DateMarker => DATE_MARKER,
            ExtractedLabel::Ticker(t) => t,
            ExtractedLabel::Unmatched(l) => l,
        }
    }

    pub fn into_label(self) -> String {
        match self {
            ExtractedLabel::DateMarker => DATE_MARKER.to_string(),
            ExtractedLabel::Ticker(t) => t,
            ExtractedLabel::Unmatched(l) => l,
        }
    }

    #[inline]
    pub fn is_date_marker(&self) -> bool {
        matches!(self, ExtractedLabel::DateMarker)
    }
}

/// A single pure label rewrite.
pub trait LabelRule: Send + Sync {
    /// Rule name for logs.
    fn name(&self) -> &'static str;

    /// Rewrite a trimmed label, or `None` to defer to the next rule.
    fn apply(&self, trimmed: &str) -> Option<ExtractedLabel>;
}

/// Exact, case-insensitive match on the date token.
#[derive(Debug, Clone)]
pub struct DateMarkerRule {
    token: String,
}

impl DateMarkerRule {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.trim().to_lowercase(),
        }
    }
}

impl LabelRule for DateMarkerRule {
    fn name(&self) -> &'static str {
        "date-marker"
    }

    fn apply(&self, trimmed: &str) -> Option<ExtractedLabel> {
        (trimmed.to_lowercase() == self.token).then_some(ExtractedLabel::DateMarker)
    }
}

/// First substring matching the ticker pattern.
#[derive(Debug, Clone)]
pub struct TickerPatternRule {
    pattern: Regex,
}

impl TickerPatternRule {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::config(format!("invalid ticker pattern '{pattern}': {e}")))?;
        Ok(Self { pattern })
    }
}

impl Default for TickerPatternRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_TICKER_PATTERN).expect("default ticker pattern compiles"),
        }
    }
}

impl LabelRule for TickerPatternRule {
    fn name(&self) -> &'static str {
        "ticker-pattern"
    }

    fn apply(&self, trimmed: &str) -> Option<ExtractedLabel> {
        self.pattern
            .find(trimmed)
            .map(|m| ExtractedLabel::Ticker(m.as_str().to_string()))
    }
}

/// Ordered rule list applied to every column label.
pub struct LabelExtractor {
    rules: Vec<Box<dyn LabelRule>>,
}

impl LabelExtractor {
    /// Date-marker rule, then ticker-pattern rule, from configuration.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        Ok(Self::with_rules(vec![
            Box::new(DateMarkerRule::new(&config.date_token)),
            Box::new(TickerPatternRule::new(&config.ticker_pattern)?),
        ]))
    }

    /// Custom rule list, applied in the given order.
    pub fn with_rules(rules: Vec<Box<dyn LabelRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Rewrite one label.
    pub fn extract(&self, label: &str) -> ExtractedLabel {
        let trimmed = label.trim();
        for rule in &self.rules {
            if let Some(extracted) = rule.apply(trimmed) {
                trace!(rule = rule.name(), label, result = extracted.label(), "label rewritten");
                return extracted;
            }
        }
        trace!(label, "label kept verbatim");
        ExtractedLabel::Unmatched(label.to_string())
    }

    /// Rewrite every label, preserving order.
    pub fn extract_all<S: AsRef<str>>(&self, labels: &[S]) -> Vec<ExtractedLabel> {
        labels.iter().map(|l| self.extract(l.as_ref())).collect()
    }
}

impl Default for LabelExtractor {
    fn default() -> Self {
        Self::with_rules(vec![
            Box::new(DateMarkerRule::new("data")),
            Box::new(TickerPatternRule::default()),
        ])
    }
}

impl std::fmt::Debug for LabelExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelExtractor")
            .field("rules", &self.rule_names())
            .finish()
    }
}
