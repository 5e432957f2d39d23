//! Structure stage: peaks, troughs and support/resistance levels
//!
//! Extrema are detected on the cleaned close series only. A point is a peak
//! when it is strictly greater than every neighbour within `order` bars on each
//! side; troughs are peaks of the negated series. Candidates are then thinned
//! so that no two extrema of the same kind sit closer than `min_distance`
//! indices.

use serde::{Deserialize, Serialize};

/// How minimum spacing between extrema of one kind is enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacingRule {
    /// Single left-to-right scan; a candidate closer than `min_distance` to
    /// the last accepted extremum is rejected.
    #[default]
    LeftToRight,
    /// Most pronounced candidates claim their neighbourhood first; later
    /// candidates within `min_distance` of a kept one are discarded.
    TallestFirst,
}

/// A local extremum of the cleaned close series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    /// Position in the cleaned series
    pub index: usize,
    pub price: f64,
}

/// Peaks and troughs of one series, each in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtremumSet {
    pub peaks: Vec<Extremum>,
    pub troughs: Vec<Extremum>,
}

impl ExtremumSet {
    /// Detects peaks and troughs of `closes`.
    pub fn detect(closes: &[f64], order: usize, min_distance: usize, rule: SpacingRule) -> Self {
        let negated: Vec<f64> = closes.iter().map(|c| -c).collect();
        let to_extrema = |indices: Vec<usize>| {
            indices
                .into_iter()
                .map(|index| Extremum {
                    index,
                    price: closes[index],
                })
                .collect()
        };

        Self {
            peaks: to_extrema(find_peaks(closes, order, min_distance, rule)),
            troughs: to_extrema(find_peaks(&negated, order, min_distance, rule)),
        }
    }

    /// Prices of the last `max` peaks, oldest first.
    #[inline]
    pub fn resistance_levels(&self, max: usize) -> Vec<f64> {
        last_prices(&self.peaks, max)
    }

    /// Prices of the last `max` troughs, oldest first.
    #[inline]
    pub fn support_levels(&self, max: usize) -> Vec<f64> {
        last_prices(&self.troughs, max)
    }

    /// The last `n` peaks in chronological order, if at least `n` exist.
    #[inline]
    pub fn last_peaks(&self, n: usize) -> Option<&[Extremum]> {
        last_n(&self.peaks, n)
    }

    /// The last `n` troughs in chronological order, if at least `n` exist.
    #[inline]
    pub fn last_troughs(&self, n: usize) -> Option<&[Extremum]> {
        last_n(&self.troughs, n)
    }
}

fn last_prices(extrema: &[Extremum], max: usize) -> Vec<f64> {
    let start = extrema.len().saturating_sub(max);
    extrema[start..].iter().map(|e| e.price).collect()
}

fn last_n(extrema: &[Extremum], n: usize) -> Option<&[Extremum]> {
    (n > 0 && extrema.len() >= n).then(|| &extrema[extrema.len() - n..])
}

// ============================================================
// PEAK DETECTION
// ============================================================

/// Indices (ascending) of spaced local maxima of `values`.
pub fn find_peaks(values: &[f64], order: usize, min_distance: usize, rule: SpacingRule) -> Vec<usize> {
    let candidates = local_maxima(values, order);
    match rule {
        SpacingRule::LeftToRight => space_left_to_right(&candidates, min_distance),
        SpacingRule::TallestFirst => space_tallest_first(values, &candidates, min_distance),
    }
}

/// Points strictly greater than every neighbour within `order` bars on both
/// sides. Points without a full neighbourhood are never candidates.
///
/// Flat tops (`[1, 3, 3, 1]`) are not peaks here, whereas scipy's
/// `find_peaks` reports them at their midpoint.
pub fn local_maxima(values: &[f64], order: usize) -> Vec<usize> {
    let order = order.max(1);
    if values.len() < 2 * order + 1 {
        return Vec::new();
    }

    (order..values.len() - order)
        .filter(|&i| {
            let v = values[i];
            (i - order..=i + order).all(|j| j == i || v > values[j])
        })
        .collect()
}

fn space_left_to_right(candidates: &[usize], min_distance: usize) -> Vec<usize> {
    let mut accepted = Vec::with_capacity(candidates.len());
    let mut last: Option<usize> = None;

    for &i in candidates {
        if last.map_or(true, |l| i - l >= min_distance) {
            accepted.push(i);
            last = Some(i);
        }
    }

    accepted
}

fn space_tallest_first(values: &[f64], candidates: &[usize], min_distance: usize) -> Vec<usize> {
    // ascending by height, stable; walked from the back so later indices win ties
    let mut by_height: Vec<usize> = (0..candidates.len()).collect();
    by_height.sort_by(|&a, &b| values[candidates[a]].total_cmp(&values[candidates[b]]));

    let mut keep = vec![true; candidates.len()];
    for &k in by_height.iter().rev() {
        if !keep[k] {
            continue;
        }
        let center = candidates[k];

        for j in (0..k).rev() {
            if center - candidates[j] >= min_distance {
                break;
            }
            keep[j] = false;
        }
        for j in k + 1..candidates.len() {
            if candidates[j] - center >= min_distance {
                break;
            }
            keep[j] = false;
        }
    }

    candidates
        .iter()
        .zip(keep)
        .filter_map(|(&i, kept)| kept.then_some(i))
        .collect()
}
