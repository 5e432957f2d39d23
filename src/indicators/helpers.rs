//! Shared kernels for the indicator transforms
//!
//! A non-finite price is a missing observation. Every kernel works on the
//! finite runs ("segments") of its input: trailing windows never span a gap and
//! recursive smoothers restart their warm-up after one.

use std::ops::Range;

// ============================================================
// SEGMENTS
// ============================================================

/// Contiguous index ranges where `is_present(i)` holds.
pub fn present_segments(len: usize, mut is_present: impl FnMut(usize) -> bool) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut start = None;

    for i in 0..len {
        match (is_present(i), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                segments.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        segments.push(s..len);
    }

    segments
}

/// Finite runs of `values`.
#[inline]
pub fn finite_segments(values: &[f64]) -> Vec<Range<usize>> {
    present_segments(values.len(), |i| values[i].is_finite())
}

/// Turns an optional series back into a dense one, `None` becoming NaN.
#[inline]
pub fn densify(series: &[Option<f64>]) -> Vec<f64> {
    series.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

// ============================================================
// ROLLING WINDOWS
// ============================================================

/// Applies `f` to every full trailing window of `window` values that fits
/// inside a finite segment. The value lands on the window's last index.
pub fn rolling(
    values: &[f64],
    window: usize,
    f: impl Fn(&[f64]) -> Option<f64>,
) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    for segment in finite_segments(values) {
        if segment.len() < window {
            continue;
        }
        for end in (segment.start + window)..=segment.end {
            out[end - 1] = f(&values[end - window..end]);
        }
    }

    out
}

/// Arithmetic mean of a non-empty slice.
#[inline]
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom (0 = population,
/// 1 = sample). `None` when the slice is too short for the requested `ddof`.
#[inline]
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((sum_sq / (n - ddof) as f64).sqrt())
}

/// Trailing mean over `window` values.
#[inline]
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Trailing standard deviation over `window` values.
#[inline]
pub fn rolling_std(values: &[f64], window: usize, ddof: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| std_dev(w, ddof))
}

// ============================================================
// RECURSIVE SMOOTHING
// ============================================================

/// Exponential smoothing `y[i] = alpha * x[i] + (1 - alpha) * y[i-1]`, seeded
/// with the first value of each segment. Output is masked until `min_periods`
/// observations of the segment have been seen.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];

    for segment in finite_segments(values) {
        let mut state = values[segment.start];
        for (seen, i) in segment.clone().enumerate() {
            if seen > 0 {
                state = alpha * values[i] + (1.0 - alpha) * state;
            }
            if seen + 1 >= min_periods {
                out[i] = Some(state);
            }
        }
    }

    out
}

/// Wilder's smoothing: seeded with the mean of the first `period` values of a
/// segment, then `y[i] = (y[i-1] * (period - 1) + x[i]) / period`.
pub fn wilder(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let n = period as f64;

    for segment in finite_segments(values) {
        if segment.len() < period {
            continue;
        }
        let seed_end = segment.start + period;
        let Some(mut state) = mean(&values[segment.start..seed_end]) else {
            continue;
        };
        out[seed_end - 1] = Some(state);
        for i in seed_end..segment.end {
            state = (state * (n - 1.0) + values[i]) / n;
            out[i] = Some(state);
        }
    }

    out
}

// ============================================================
// TESTS
// ============================================================
