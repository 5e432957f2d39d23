//! Assessment record and the assembly stage

use serde::{Deserialize, Serialize};

use crate::{
    patterns::{ChartPattern, PatternMatch},
    structure::ExtremumSet,
    table::IndicatorRow,
};

/// Technical-assessment snapshot of one symbol at its most recent clean bar.
///
/// Serialized with the keys the report layer consumes (`ticker`, `sma_50`,
/// `rsi`, `macd`, `bollinger_hband`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    #[serde(rename = "ticker")]
    pub symbol: String,
    pub current_price: f64,
    #[serde(rename = "sma_50")]
    pub sma_fast: f64,
    #[serde(rename = "sma_200")]
    pub sma_slow: f64,
    #[serde(rename = "rsi")]
    pub momentum_oscillator: f64,
    #[serde(rename = "macd")]
    pub trend_diff: f64,
    /// 1 when the close is above the upper band
    #[serde(rename = "bollinger_hband")]
    pub band_hi_flag: u8,
    /// 1 when the close is below the lower band
    #[serde(rename = "bollinger_lband")]
    pub band_lo_flag: u8,
    pub atr: f64,
    pub volatility: f64,
    #[serde(rename = "momentum")]
    pub momentum_delta: f64,
    /// Most recent trough prices, oldest first
    pub support_levels: Vec<f64>,
    /// Most recent peak prices, oldest first
    pub resistance_levels: Vec<f64>,
    pub identified_patterns: Vec<ChartPattern>,
}

impl AssessmentRecord {
    /// Whether `pattern` was identified
    #[inline]
    pub fn has_pattern(&self, pattern: ChartPattern) -> bool {
        self.identified_patterns.contains(&pattern)
    }
}

/// Builds the record from the last clean row and the structural findings.
///
/// Pure extraction: nothing is recomputed here.
pub fn assemble(
    symbol: &str,
    last: &IndicatorRow,
    extrema: &ExtremumSet,
    patterns: &[PatternMatch],
    max_levels: usize,
) -> AssessmentRecord {
    let mut identified_patterns = Vec::with_capacity(patterns.len());
    for m in patterns {
        if !identified_patterns.contains(&m.pattern) {
            identified_patterns.push(m.pattern);
        }
    }

    AssessmentRecord {
        symbol: symbol.to_string(),
        current_price: last.close,
        sma_fast: last.sma_fast,
        sma_slow: last.sma_slow,
        momentum_oscillator: last.rsi,
        trend_diff: last.macd_diff,
        band_hi_flag: u8::from(last.band_hi),
        band_lo_flag: u8::from(last.band_lo),
        atr: last.atr,
        volatility: last.volatility,
        momentum_delta: last.momentum,
        support_levels: extrema.support_levels(max_levels),
        resistance_levels: extrema.resistance_levels(max_levels),
        identified_patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{structure::Extremum, Direction};

    fn row() -> IndicatorRow {
        IndicatorRow {
            index: 250,
            date: None,
            close: 123.45,
            high: 124.0,
            low: 122.0,
            sma_fast: 120.0,
            sma_slow: 110.0,
            rsi: 61.5,
            macd_diff: -0.25,
            band_hi: true,
            band_lo: false,
            atr: 2.5,
            volatility: 0.31,
            momentum: 4.2,
        }
    }

    #[test]
    fn test_assemble_extracts_last_row() {
        let extrema = ExtremumSet {
            peaks: (0..5)
                .map(|i| Extremum {
                    index: i * 30,
                    price: 100.0 + i as f64,
                })
                .collect(),
            troughs: vec![Extremum {
                index: 15,
                price: 90.0,
            }],
        };
        let record = assemble("AAPL", &row(), &extrema, &[], 3);

        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.current_price, 123.45);
        assert_eq!(record.band_hi_flag, 1);
        assert_eq!(record.band_lo_flag, 0);
        assert_eq!(record.trend_diff, -0.25);
        assert_eq!(record.resistance_levels, vec![102.0, 103.0, 104.0]);
        assert_eq!(record.support_levels, vec![90.0]);
        assert!(record.identified_patterns.is_empty());
    }

    #[test]
    fn test_assemble_dedups_patterns_in_order() {
        let m = |pattern: ChartPattern| PatternMatch {
            pattern,
            direction: Direction::Bearish,
            start_index: 0,
            end_index: 1,
        };
        let patterns = [
            m(ChartPattern::DoubleTop),
            m(ChartPattern::HeadAndShoulders),
            m(ChartPattern::DoubleTop),
        ];
        let record = assemble("X", &row(), &ExtremumSet::default(), &patterns, 3);
        assert_eq!(
            record.identified_patterns,
            vec![ChartPattern::DoubleTop, ChartPattern::HeadAndShoulders]
        );
        assert!(record.has_pattern(ChartPattern::DoubleTop));
        assert!(!record.has_pattern(ChartPattern::DoubleBottom));
    }

    #[test]
    fn test_wire_keys() {
        let record = assemble("MSFT", &row(), &ExtremumSet::default(), &[], 3);
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "ticker",
            "current_price",
            "sma_50",
            "sma_200",
            "rsi",
            "macd",
            "bollinger_hband",
            "bollinger_lband",
            "atr",
            "volatility",
            "momentum",
            "support_levels",
            "resistance_levels",
            "identified_patterns",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["bollinger_hband"], 1);

        let back: AssessmentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
