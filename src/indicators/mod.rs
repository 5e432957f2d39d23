//! Indicator stage
//!
//! Each indicator is an independent pure transform over price columns, looking
//! only at the current and past bars. [`compute`] runs the fixed set the
//! assessment needs and assembles them into one [`IndicatorColumns`] table.
//!
//! # Indicators
//!
//! - **Trend**: fast/slow simple moving averages, EMAs
//! - **Momentum**: RSI-style oscillator, MACD-style trend difference, momentum delta
//! - **Volatility**: Bollinger-style band breaches, average true range, realized volatility

pub mod helpers;
pub mod momentum;
pub mod trend;
pub mod volatility;

pub use momentum::{macd, macd_diff, momentum, rsi, MacdPoint};
pub use trend::{ema, sma};
pub use volatility::{atr, band_breaches, bollinger, realized_volatility, true_range, AtrSmoothing, Bands};

use crate::{params::AssessmentParams, table::IndicatorColumns, OHLCV};

/// Computes every indicator of the assessment for `bars`.
pub fn compute<T: OHLCV>(bars: &[T], params: &AssessmentParams) -> IndicatorColumns {
    let close: Vec<f64> = bars.iter().map(|b| b.close()).collect();
    let high: Vec<f64> = bars.iter().map(|b| b.high()).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.low()).collect();

    let bands = bollinger(&close, params.bollinger_window.get(), params.bollinger_k);
    let (band_hi, band_lo) = band_breaches(&close, &bands);

    IndicatorColumns {
        dates: bars.iter().map(|b| b.date()).collect(),
        sma_fast: sma(&close, params.sma_fast.get()),
        sma_slow: sma(&close, params.sma_slow.get()),
        rsi: rsi(&close, params.rsi_period.get()),
        macd_diff: macd_diff(
            &close,
            params.macd_fast.get(),
            params.macd_slow.get(),
            params.macd_signal.get(),
        ),
        band_hi,
        band_lo,
        atr: atr(&high, &low, &close, params.atr_period.get(), params.atr_smoothing),
        volatility: realized_volatility(
            &close,
            params.volatility_window.get(),
            params.trading_days.get(),
        ),
        momentum: momentum(&close, params.momentum_period.get()),
        close,
        high,
        low,
    }
}
