//! Ordered parse strategies with aggregated failure reasons.
//!
//! Each loader is expressed as one or more strategies. They are tried in
//! order; the first success wins, and when every strategy fails the
//! resulting `MalformedInput` carries every reason in the order tried.

use liquidity_core::{error::AttemptFailure, LoadError, RawTable};
use tracing::{debug, info};

/// One way of turning bytes into a raw table.
pub trait ParseStrategy {
    /// Short name used in logs and error details, e.g. `csv[;]`.
    fn name(&self) -> String;

    /// Parse the whole content, or explain why not.
    fn parse(&self, content: &[u8]) -> Result<RawTable, String>;
}

/// Run strategies in order against the same content.
pub fn run_strategies(
    strategies: &[Box<dyn ParseStrategy>],
    content: &[u8],
) -> Result<RawTable, LoadError> {
    let mut failures = Vec::new();

    for strategy in strategies {
        match strategy.parse(content) {
            Ok(table) => {
                if !failures.is_empty() {
                    info!(
                        strategy = %strategy.name(),
                        failed_attempts = failures.len(),
                        "parsed after fallback"
                    );
                }
                return Ok(table);
            }
            Err(reason) => {
                debug!(strategy = %strategy.name(), %reason, "parse attempt failed");
                failures.push(AttemptFailure::new(strategy.name(), reason));
            }
        }
    }

    if failures.is_empty() {
        return Err(LoadError::malformed("no parse strategy available"));
    }
    Err(LoadError::from_attempts(failures))
}

/// Drop a leading UTF-8 byte-order mark.
pub(crate) fn strip_bom(content: &[u8]) -> &[u8] {
    content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content)
}

/// Header text for a column, naming blank headers by position.
pub(crate) fn header_label(raw: &str, idx: usize) -> String {
    if raw.trim().is_empty() {
        format!("Unnamed: {idx}")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquidity_core::CellValue;

    struct Fails(&'static str);

    impl ParseStrategy for Fails {
        fn name(&self) -> String {
            format!("fails[{}]", self.0)
        }

        fn parse(&self, _content: &[u8]) -> Result<RawTable, String> {
            Err(format!("{} broke", self.0))
        }
    }

    struct Succeeds;

    impl ParseStrategy for Succeeds {
        fn name(&self) -> String {
            "ok".to_string()
        }

        fn parse(&self, _content: &[u8]) -> Result<RawTable, String> {
            RawTable::new(vec!["a".into()], vec![vec![CellValue::Null]]).map_err(|e| e.to_string())
        }
    }

    #[test]
    fn test_first_success_wins() {
        let strategies: Vec<Box<dyn ParseStrategy>> =
            vec![Box::new(Fails("a")), Box::new(Succeeds), Box::new(Fails("b"))];
        let table = run_strategies(&strategies, b"").unwrap();
        assert_eq!(table.columns(), &["a"]);
    }

    #[test]
    fn test_all_failures_are_kept() {
        let strategies: Vec<Box<dyn ParseStrategy>> =
            vec![Box::new(Fails("a")), Box::new(Fails("b"))];
        let err = run_strategies(&strategies, b"").unwrap_err();
        let names: Vec<&str> = err.attempts().iter().map(|a| a.strategy.as_str()).collect();
        assert_eq!(names, vec!["fails[a]", "fails[b]"]);
        assert!(err.to_string().contains("a broke; fails[b]: b broke"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(strip_bom(b"\xEF\xBB\xBFData"), b"Data");
        assert_eq!(strip_bom(b"Data"), b"Data");
        assert_eq!(header_label("  ", 3), "Unnamed: 3");
        assert_eq!(header_label(" BOVA11 ", 1), " BOVA11 ");
    }
}
