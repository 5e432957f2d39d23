//! Volatility indicators: Bollinger-style bands, average true range and
//! annualized realized volatility

use serde::{Deserialize, Serialize};

use super::helpers::{present_segments, rolling_mean, rolling_std, wilder};

// ============================================================
// BOLLINGER BANDS
// ============================================================

/// Band values for one bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

/// Trailing mean of `closes` over `window` bars, plus/minus `k` population
/// standard deviations.
pub fn bollinger(closes: &[f64], window: usize, k: f64) -> Vec<Option<Bands>> {
    let middle = rolling_mean(closes, window);
    let deviation = rolling_std(closes, window, 0);

    middle
        .iter()
        .zip(&deviation)
        .map(|(m, d)| {
            let (middle, d) = ((*m)?, (*d)?);
            Some(Bands {
                lower: middle - k * d,
                middle,
                upper: middle + k * d,
            })
        })
        .collect()
}

/// Per-bar breach flags: `(close > upper, close < lower)`.
///
/// Both are `None` while the bands are still warming up.
pub fn band_breaches(
    closes: &[f64],
    bands: &[Option<Bands>],
) -> (Vec<Option<bool>>, Vec<Option<bool>>) {
    closes
        .iter()
        .zip(bands)
        .map(|(close, band)| match band {
            Some(b) => (Some(*close > b.upper), Some(*close < b.lower)),
            None => (None, None),
        })
        .unzip()
}

// ============================================================
// AVERAGE TRUE RANGE
// ============================================================

/// How true ranges are averaged into the ATR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtrSmoothing {
    /// Wilder's recursive smoothing seeded with the mean of the first window
    #[default]
    Wilder,
    /// Plain trailing mean of the last `period` true ranges
    Simple,
}

/// True range per bar: the largest of `high - low`, `|high - prev close|` and
/// `|low - prev close|`.
///
/// Without a usable previous close (first bar, or after a gap) it falls back
/// to `high - low`. A bar with a missing high or low yields NaN.
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    let len = highs.len().min(lows.len()).min(closes.len());

    (0..len)
        .map(|i| {
            let (high, low) = (highs[i], lows[i]);
            if !high.is_finite() || !low.is_finite() {
                return f64::NAN;
            }
            let range = high - low;
            match i.checked_sub(1).map(|p| closes[p]) {
                Some(prev) if prev.is_finite() => {
                    range.max((high - prev).abs()).max((low - prev).abs())
                }
                _ => range,
            }
        })
        .collect()
}

/// Average true range over `period` bars.
pub fn atr(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    smoothing: AtrSmoothing,
) -> Vec<Option<f64>> {
    let tr = true_range(highs, lows, closes);
    match smoothing {
        AtrSmoothing::Wilder => wilder(&tr, period),
        AtrSmoothing::Simple => rolling_mean(&tr, period),
    }
}

// ============================================================
// REALIZED VOLATILITY
// ============================================================

/// Sample standard deviation of daily percentage returns over `window`
/// returns, annualized by `sqrt(trading_days)`.
///
/// The first value appears at index `window` of a gap-free series, since the
/// first bar has no return.
pub fn realized_volatility(closes: &[f64], window: usize, trading_days: usize) -> Vec<Option<f64>> {
    let mut returns = vec![f64::NAN; closes.len()];
    for segment in present_segments(closes.len(), |i| closes[i].is_finite() && closes[i] != 0.0) {
        for i in (segment.start + 1)..segment.end {
            returns[i] = closes[i] / closes[i - 1] - 1.0;
        }
    }

    let scale = (trading_days as f64).sqrt();
    rolling_std(&returns, window, 1)
        .into_iter()
        .map(|sd| sd.map(|sd| sd * scale))
        .collect()
}
