//! Indicator table and the cleaning stage
//!
//! [`IndicatorColumns`] is the wide, column-oriented output of the indicator
//! stage: one cell per input bar, `None` wherever an indicator is still warming
//! up or its window touches a gap. Cleaning keeps only fully defined rows and
//! turns them into [`IndicatorRow`]s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AssessmentError, Result};

/// Column-oriented indicator table aligned 1:1 with the input bars
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorColumns {
    pub dates: Vec<Option<NaiveDate>>,
    pub close: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub sma_fast: Vec<Option<f64>>,
    pub sma_slow: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd_diff: Vec<Option<f64>>,
    pub band_hi: Vec<Option<bool>>,
    pub band_lo: Vec<Option<bool>>,
    pub atr: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
    pub momentum: Vec<Option<f64>>,
}

/// One fully populated row of the cleaned indicator table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    /// Position of the source bar in the input series
    pub index: usize,
    pub date: Option<NaiveDate>,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    /// Momentum oscillator, 0..=100
    pub rsi: f64,
    /// Trend difference (MACD histogram)
    pub macd_diff: f64,
    /// Close above the upper band
    pub band_hi: bool,
    /// Close below the lower band
    pub band_lo: bool,
    pub atr: f64,
    /// Annualized realized volatility
    pub volatility: f64,
    pub momentum: f64,
}

impl IndicatorColumns {
    /// Number of rows (input bars)
    #[inline]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Row `i` if every required indicator is defined there.
    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        let close = *self.close.get(i)?;
        if !close.is_finite() {
            return None;
        }

        Some(IndicatorRow {
            index: i,
            date: self.dates.get(i).copied().flatten(),
            close,
            high: self.high.get(i).copied().unwrap_or(f64::NAN),
            low: self.low.get(i).copied().unwrap_or(f64::NAN),
            sma_fast: (*self.sma_fast.get(i)?)?,
            sma_slow: (*self.sma_slow.get(i)?)?,
            rsi: (*self.rsi.get(i)?)?,
            macd_diff: (*self.macd_diff.get(i)?)?,
            band_hi: (*self.band_hi.get(i)?)?,
            band_lo: (*self.band_lo.get(i)?)?,
            atr: (*self.atr.get(i)?)?,
            volatility: (*self.volatility.get(i)?)?,
            momentum: (*self.momentum.get(i)?)?,
        })
    }

    /// Drops every row with an undefined indicator. Rows are never padded.
    pub fn clean(&self) -> Vec<IndicatorRow> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }
}

/// Rejects inputs too short to seat the slowest indicator.
#[inline]
pub fn ensure_min_bars(required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(AssessmentError::InsufficientData {
            required,
            available,
        });
    }
    Ok(())
}

/// Closing prices of the cleaned table, the input of the structure stage.
#[inline]
pub fn closes(rows: &[IndicatorRow]) -> Vec<f64> {
    rows.iter().map(|r| r.close).collect()
}
