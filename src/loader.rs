//! Series loader seam
//!
//! Fetching price history is the caller's concern (network access, retries,
//! caching). The engine only needs something that hands back an ordered daily
//! series for a symbol and a lookback descriptor such as `"1y"`, `"2y"` or
//! `"5y"`. The descriptor vocabulary is not validated by the engine; only the
//! resulting row count matters.

use std::collections::HashMap;

use crate::{AssessmentError, PriceBar, Result};

/// Lookback used when the caller does not ask for one
pub const DEFAULT_LOOKBACK: &str = "1y";

/// Source of daily OHLC history, ascending by date and split/dividend adjusted
pub trait SeriesLoader: Send + Sync {
    fn load(&self, symbol: &str, lookback: &str) -> Result<Vec<PriceBar>>;
}

/// Approximate number of daily bars covered by a lookback descriptor.
///
/// Understands `<n>d`, `<n>wk`, `<n>mo` and `<n>y`; anything else (`"max"`,
/// `"ytd"`, unknown, or a count too large to represent) means the whole
/// history.
pub fn lookback_bars(lookback: &str) -> Option<usize> {
    let lookback = lookback.trim().to_ascii_lowercase();
    let split = lookback.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = lookback.split_at(split);
    let amount: usize = amount.parse().ok()?;

    let per_unit = match unit {
        "d" => 1,
        "wk" => 5,
        "mo" => 21,
        "y" => 252,
        _ => return None,
    };
    amount.checked_mul(per_unit)
}

/// In-memory loader over preloaded series, trimming to the requested lookback
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    series: HashMap<String, Vec<PriceBar>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the full history of `symbol`
    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<PriceBar>) {
        self.series.insert(symbol.into(), bars);
    }

    pub fn with_series(mut self, symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        self.insert(symbol, bars);
        self
    }
}

impl SeriesLoader for MemoryLoader {
    fn load(&self, symbol: &str, lookback: &str) -> Result<Vec<PriceBar>> {
        let bars = self.series.get(symbol).ok_or_else(|| AssessmentError::Load {
            symbol: symbol.to_string(),
            reason: "unknown symbol".to_string(),
        })?;

        let start = lookback_bars(lookback).map_or(0, |n| bars.len().saturating_sub(n));
        Ok(bars[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;

    fn history(n: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let date = start + Days::new(i as u64);
                PriceBar::new(date, 10.0, 11.0, 9.0, 10.0, 100)
            })
            .collect()
    }

    #[test]
    fn test_lookback_bars() {
        assert_eq!(lookback_bars("1y"), Some(252));
        assert_eq!(lookback_bars("5Y"), Some(1260));
        assert_eq!(lookback_bars("6mo"), Some(126));
        assert_eq!(lookback_bars("2wk"), Some(10));
        assert_eq!(lookback_bars("30d"), Some(30));
        assert_eq!(lookback_bars("max"), None);
        assert_eq!(lookback_bars("ytd"), None);
        assert_eq!(lookback_bars("12"), None);
    }

    #[test]
    fn test_lookback_bars_overflow_is_full_history() {
        assert_eq!(lookback_bars("100000000000000000y"), None);
        assert_eq!(lookback_bars("99999999999999999999999d"), None);

        let loader = MemoryLoader::new().with_series("SPY", history(300));
        assert_eq!(loader.load("SPY", "100000000000000000y").unwrap().len(), 300);
    }

    #[test]
    fn test_memory_loader_trims_to_lookback() {
        let loader = MemoryLoader::new().with_series("SPY", history(600));
        assert_eq!(loader.load("SPY", "1y").unwrap().len(), 252);
        assert_eq!(loader.load("SPY", "5y").unwrap().len(), 600);
        assert_eq!(loader.load("SPY", "max").unwrap().len(), 600);

        let last = loader.load("SPY", "30d").unwrap();
        assert_eq!(last.last(), history(600).last());
    }

    #[test]
    fn test_memory_loader_unknown_symbol() {
        let loader = MemoryLoader::new();
        assert!(matches!(
            loader.load("NOPE", DEFAULT_LOOKBACK),
            Err(AssessmentError::Load { .. })
        ));
    }
}
