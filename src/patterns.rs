//! Chart pattern detectors
//!
//! Rule-based heuristics over an already detected [`ExtremumSet`]. Every
//! detector sees the same extrema, so checks are consistent with each other
//! and with the reported support/resistance levels. Checks run in a fixed
//! order and all matches are reported together; no pattern excludes another.
//!
//! # Patterns
//!
//! - **Head and Shoulders**: last three peaks, middle one highest
//! - **Double Top**: last two peaks within a relative tolerance (3%)
//! - **Double Bottom**: last two troughs within a relative tolerance (3%)
//!
//! These are intentionally naive: no neckline, symmetry or volume checks.

#![allow(clippy::default_constructed_unit_structs)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    params::{get_ratio, ParamMeta, ParameterizedDetector},
    structure::{Extremum, ExtremumSet},
    AssessmentError, Direction, Ratio, Result,
};

// ============================================================
// PATTERN IDS AND MATCHES
// ============================================================

/// Named chart pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartPattern {
    #[serde(rename = "Head and Shoulders")]
    HeadAndShoulders,
    #[serde(rename = "Double Top")]
    DoubleTop,
    #[serde(rename = "Double Bottom")]
    DoubleBottom,
}

impl ChartPattern {
    /// Display name used in assessment records
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPattern::HeadAndShoulders => "Head and Shoulders",
            ChartPattern::DoubleTop => "Double Top",
            ChartPattern::DoubleBottom => "Double Bottom",
        }
    }

    /// Returns the typical direction this pattern signals.
    pub fn typical_direction(&self) -> Direction {
        match self {
            ChartPattern::HeadAndShoulders | ChartPattern::DoubleTop => Direction::Bearish,
            ChartPattern::DoubleBottom => Direction::Bullish,
        }
    }
}

impl std::fmt::Display for ChartPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of pattern detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: ChartPattern,
    pub direction: Direction,
    /// Index (in the cleaned series) of the first extremum of the formation
    pub start_index: usize,
    /// Index (in the cleaned series) of the last extremum of the formation
    pub end_index: usize,
}

impl PatternMatch {
    fn spanning(pattern: ChartPattern, extrema: &[Extremum]) -> Option<Self> {
        Some(Self {
            pattern,
            direction: pattern.typical_direction(),
            start_index: extrema.first()?.index,
            end_index: extrema.last()?.index,
        })
    }
}

// ============================================================
// DETECTOR TRAIT
// ============================================================

/// Chart pattern detector over detected extrema
pub trait ChartPatternDetector: Send + Sync {
    fn id(&self) -> ChartPattern;
    fn detect(&self, extrema: &ExtremumSet) -> Option<PatternMatch>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

/// `|b - a| / a < tolerance`. A zero or non-finite reference never matches.
#[inline]
pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    let ratio = (b - a).abs() / a;
    ratio.is_finite() && ratio < tolerance
}

/// Rejects a zero tolerance; no pair of prices can match it.
fn validate_tolerance(tolerance: Ratio) -> Result<()> {
    if tolerance.get() <= 0.0 {
        return Err(AssessmentError::InvalidConfig(
            "pattern tolerance must be > 0".to_string(),
        ));
    }
    Ok(())
}

// ============================================================
// HEAD AND SHOULDERS
// ============================================================

/// Last three peaks where the middle one (head) tops both shoulders
#[derive(Debug, Clone, Default)]
pub struct HeadAndShouldersDetector;

impl ChartPatternDetector for HeadAndShouldersDetector {
    fn id(&self) -> ChartPattern {
        ChartPattern::HeadAndShoulders
    }

    fn detect(&self, extrema: &ExtremumSet) -> Option<PatternMatch> {
        let peaks = extrema.last_peaks(3)?;
        let (left, head, right) = (peaks[0].price, peaks[1].price, peaks[2].price);

        if head > left && head > right {
            PatternMatch::spanning(self.id(), peaks)
        } else {
            None
        }
    }
}

// ============================================================
// DOUBLE TOP / DOUBLE BOTTOM
// ============================================================

/// Last two peaks at nearly the same price
#[derive(Debug, Clone)]
pub struct DoubleTopDetector {
    pub tolerance: Ratio,
}

impl Default for DoubleTopDetector {
    fn default() -> Self {
        Self {
            tolerance: Ratio::new_const(0.03),
        }
    }
}

impl ChartPatternDetector for DoubleTopDetector {
    fn id(&self) -> ChartPattern {
        ChartPattern::DoubleTop
    }

    fn detect(&self, extrema: &ExtremumSet) -> Option<PatternMatch> {
        let peaks = extrema.last_peaks(2)?;
        within_tolerance(peaks[0].price, peaks[1].price, self.tolerance.get())
            .then(|| PatternMatch::spanning(self.id(), peaks))
            .flatten()
    }

    fn validate_config(&self) -> Result<()> {
        validate_tolerance(self.tolerance)
    }
}

/// Last two troughs at nearly the same price
#[derive(Debug, Clone)]
pub struct DoubleBottomDetector {
    pub tolerance: Ratio,
}

impl Default for DoubleBottomDetector {
    fn default() -> Self {
        Self {
            tolerance: Ratio::new_const(0.03),
        }
    }
}

impl ChartPatternDetector for DoubleBottomDetector {
    fn id(&self) -> ChartPattern {
        ChartPattern::DoubleBottom
    }

    fn detect(&self, extrema: &ExtremumSet) -> Option<PatternMatch> {
        let troughs = extrema.last_troughs(2)?;
        within_tolerance(troughs[0].price, troughs[1].price, self.tolerance.get())
            .then(|| PatternMatch::spanning(self.id(), troughs))
            .flatten()
    }

    fn validate_config(&self) -> Result<()> {
        validate_tolerance(self.tolerance)
    }
}

impl HeadAndShouldersDetector {
    pub fn with_defaults() -> Self {
        Self
    }
}

impl DoubleTopDetector {
    pub fn with_defaults() -> Self {
        Self::default()
    }
}

impl DoubleBottomDetector {
    pub fn with_defaults() -> Self {
        Self::default()
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static HEAD_AND_SHOULDERS_PARAMS: &[ParamMeta] = &[];

static DOUBLE_TOP_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "tolerance",
    0.03,
    (0.01, 0.10, 0.01),
    "Maximum relative gap between the two peaks",
)];

static DOUBLE_BOTTOM_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "tolerance",
    0.03,
    (0.01, 0.10, 0.01),
    "Maximum relative gap between the two troughs",
)];

impl ParameterizedDetector for HeadAndShouldersDetector {
    fn param_meta() -> &'static [ParamMeta] {
        HEAD_AND_SHOULDERS_PARAMS
    }

    fn with_params(_params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self)
    }

    fn pattern_id_str() -> &'static str {
        ChartPattern::HeadAndShoulders.as_str()
    }
}

impl ParameterizedDetector for DoubleTopDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOUBLE_TOP_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            tolerance: get_ratio(params, "tolerance", 0.03)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        ChartPattern::DoubleTop.as_str()
    }
}

impl ParameterizedDetector for DoubleBottomDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOUBLE_BOTTOM_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            tolerance: get_ratio(params, "tolerance", 0.03)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        ChartPattern::DoubleBottom.as_str()
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - enum dispatch, in check order
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            /// One of each builtin detector with default settings, in check order
            pub fn all_defaults() -> Vec<Self> {
                vec![$(Self::$variant(<$detector>::default())),*]
            }

            #[inline]
            pub fn detect(&self, extrema: &ExtremumSet) -> Option<PatternMatch> {
                match self {
                    $(Self::$variant(d) => ChartPatternDetector::detect(d, extrema)),*
                }
            }

            #[inline]
            pub fn id(&self) -> ChartPattern {
                match self {
                    $(Self::$variant(d) => ChartPatternDetector::id(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => ChartPatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    HeadAndShoulders(HeadAndShouldersDetector),
    DoubleTop(DoubleTopDetector),
    DoubleBottom(DoubleBottomDetector),
}

/// Runs `detectors` in order, returning every match.
pub fn detect_all(detectors: &[BuiltinDetector], extrema: &ExtremumSet) -> Vec<PatternMatch> {
    detectors.iter().filter_map(|d| d.detect(extrema)).collect()
}
