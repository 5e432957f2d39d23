//! Momentum indicators: RSI-style oscillator, MACD-style trend difference and
//! price momentum delta

use super::helpers::{densify, ewm, finite_segments};
use super::trend::ema;

// ============================================================
// RELATIVE STRENGTH
// ============================================================

/// Bounded 0-100 relative strength oscillator over `period` closes.
///
/// Average gains and losses use Wilder's smoothing (`alpha = 1 / period`).
/// The first bar of every gap-free segment contributes a zero change, so the
/// first value appears once `period` closes are available (index
/// `period - 1` of a gap-free series). A window without losses reads 100.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let len = closes.len();
    if period == 0 {
        return vec![None; len];
    }

    let mut gains = vec![f64::NAN; len];
    let mut losses = vec![f64::NAN; len];
    for segment in finite_segments(closes) {
        gains[segment.start] = 0.0;
        losses[segment.start] = 0.0;
        for i in segment.start + 1..segment.end {
            let change = closes[i] - closes[i - 1];
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = ewm(&gains, alpha, period);
    let avg_loss = ewm(&losses, alpha, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (*gain, *loss) {
            (Some(_), Some(l)) if l == 0.0 => Some(100.0),
            (Some(g), Some(l)) => Some(100.0 - 100.0 / (1.0 + g / l)),
            _ => None,
        })
        .collect()
}

// ============================================================
// MACD
// ============================================================

/// MACD line, signal line and their difference for one bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub diff: f64,
}

/// MACD-style oscillator: `ema(fast) - ema(slow)` against its own
/// `signal`-span EMA.
///
/// With the standard (12, 26, 9) parameters the first point appears at
/// index 33 of a gap-free series.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<Option<MacdPoint>> {
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema(&densify(&line), signal);

    line.iter()
        .zip(&signal_line)
        .map(|(l, s)| {
            let (line, signal) = ((*l)?, (*s)?);
            Some(MacdPoint {
                line,
                signal,
                diff: line - signal,
            })
        })
        .collect()
}

/// Signal-line-relative trend difference (the MACD histogram).
#[inline]
pub fn macd_diff(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<Option<f64>> {
    macd(closes, fast, slow, signal)
        .into_iter()
        .map(|p| p.map(|p| p.diff))
        .collect()
}

// ============================================================
// MOMENTUM DELTA
// ============================================================

/// Close minus the close `period` bars earlier, within a gap-free segment.
pub fn momentum(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];

    for segment in finite_segments(closes) {
        for i in segment.clone() {
            if i >= segment.start + period {
                out[i] = Some(closes[i] - closes[i - period]);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&closes, 14);
        assert!(out[..13].iter().all(Option::is_none));
        assert!(out[13..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_rsi_first_value_after_period_closes() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00,
        ];
        let out = rsi(&closes, 14);
        assert_eq!(out[12], None);

        // zero change on the first bar, then y = a * x + (1 - a) * y
        let alpha = 1.0 / 14.0;
        let (mut gain, mut loss) = (0.0_f64, 0.0_f64);
        let mut expected = Vec::new();
        for i in 1..closes.len() {
            let change = closes[i] - closes[i - 1];
            gain = alpha * change.max(0.0) + (1.0 - alpha) * gain;
            loss = alpha * (-change).max(0.0) + (1.0 - alpha) * loss;
            expected.push(100.0 - 100.0 / (1.0 + gain / loss));
        }
        for i in 13..closes.len() {
            let got = out[i].unwrap();
            assert!((got - expected[i - 1]).abs() < 1e-9, "rsi[{i}] = {got}");
        }
    }

    #[test]
    fn test_rsi_restarts_after_gap() {
        let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.5).sin()).collect();
        closes[20] = f64::NAN;
        let out = rsi(&closes, 14);
        assert!(out[13..20].iter().all(Option::is_some));
        assert!(out[20..34].iter().all(Option::is_none));
        assert!(out[34..].iter().all(Option::is_some));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out[20], Some(0.0));
    }

    #[test]
    fn test_rsi_bounded() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + ((i * 37) % 23) as f64 - 11.0)
            .collect();
        for v in rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "rsi out of bounds: {v}");
        }
    }

    #[test]
    fn test_rsi_alternating_is_midscale() {
        let closes: Vec<f64> = (0..400)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let last = rsi(&closes, 14)[399].unwrap();
        assert!((last - 50.0).abs() < 5.0, "rsi = {last}");
    }

    #[test]
    fn test_macd_first_defined_index() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.3).sin()).collect();
        let out = macd_diff(&closes, 12, 26, 9);
        assert!(out[..33].iter().all(Option::is_none));
        assert!(out[33..].iter().all(Option::is_some));
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let out = macd(&[20.0; 50], 12, 26, 9);
        let p = out[49].unwrap();
        assert!(p.line.abs() < 1e-9);
        assert!(p.signal.abs() < 1e-9);
        assert!(p.diff.abs() < 1e-9);
    }

    #[test]
    fn test_momentum_delta() {
        let closes: Vec<f64> = (0..25).map(|i| i as f64 * 2.0).collect();
        let out = momentum(&closes, 20);
        assert!(out[..20].iter().all(Option::is_none));
        assert_eq!(out[20], Some(40.0));
        assert_eq!(out[24], Some(40.0));
    }

    #[test]
    fn test_momentum_respects_gaps() {
        let mut closes: Vec<f64> = (0..30).map(f64::from).collect();
        closes[5] = f64::NAN;
        let out = momentum(&closes, 20);
        assert_eq!(out[25], None);
        assert_eq!(out[26], Some(20.0));
    }
}
