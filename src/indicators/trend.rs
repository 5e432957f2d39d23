//! Trend indicators: simple and exponential moving averages

use super::helpers::{ewm, rolling_mean};

/// Simple moving average of `values` over a trailing `window`.
///
/// The first `window - 1` entries of every gap-free segment are `None`.
#[inline]
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_mean(values, window)
}

/// Exponential moving average with `alpha = 2 / (span + 1)`.
///
/// The recursion is seeded with the first observation (no SMA seed) and the
/// output is masked until `span` observations exist.
#[inline]
pub fn ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }
    ewm(values, 2.0 / (span as f64 + 1.0), span)
}
