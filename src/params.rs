//! Assessment parameters and parameter metadata
//!
//! [`AssessmentParams`] carries every window, multiplier and threshold of the
//! pipeline, defaulting to the conventional daily-chart settings. The metadata
//! types describe tunable values: their kind, default, accepted range and a
//! human-readable description, so overrides can be checked before use.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use yatas::params::AssessmentParams;
//!
//! let mut overrides = HashMap::new();
//! overrides.insert("sma_fast", 20.0);
//! let params = AssessmentParams::with_params(&overrides).unwrap();
//! assert_eq!(params.sma_fast.get(), 20);
//! assert_eq!(params.sma_slow.get(), 200);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  indicators::AtrSmoothing, structure::SpacingRule, AssessmentError, Period, Ratio, Result,
};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value (0.0..=1.0)
  Ratio,
  /// Period value (positive integer)
  Period,
  /// Unconstrained real multiplier (e.g. band width in standard deviations)
  Real,
}

/// Metadata for a single parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "sma_slow")
  pub name: &'static str,
  /// Parameter type
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Accepted range: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a Ratio parameter
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  /// Create a new ParamMeta for a Period parameter
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Create a new ParamMeta for a real-valued parameter
  pub const fn real(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Real, default, range, description }
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(AssessmentError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(AssessmentError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
      ParamType::Real => Ok(()),
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for chart-pattern detectors that support parameterization
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Returns the pattern name
  fn pattern_id_str() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value < 1.0 || value.fract() != 0.0 {
    return Err(AssessmentError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

/// Helper to get a finite real from params with default fallback
pub fn get_real(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !value.is_finite() {
    return Err(AssessmentError::InvalidValue("Parameter must be finite"));
  }
  Ok(value)
}

// ============================================================
// ASSESSMENT PARAMETERS
// ============================================================

/// Windows and thresholds of the whole assessment pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentParams {
  /// Fast simple moving average window
  pub sma_fast: Period,
  /// Slow simple moving average window
  pub sma_slow: Period,
  /// Relative strength oscillator window
  pub rsi_period: Period,
  pub macd_fast: Period,
  pub macd_slow: Period,
  pub macd_signal: Period,
  pub bollinger_window: Period,
  /// Band half-width in population standard deviations
  pub bollinger_k: f64,
  pub atr_period: Period,
  pub atr_smoothing: AtrSmoothing,
  /// Number of daily returns in the realized volatility window
  pub volatility_window: Period,
  /// Annualization factor for realized volatility
  pub trading_days: Period,
  /// Lag of the momentum delta
  pub momentum_period: Period,
  /// Shortest accepted input series
  pub min_bars: Period,
  /// Half-width of the neighbourhood an extremum must strictly dominate
  pub extremum_order: Period,
  /// Minimum index spacing between two extrema of the same kind
  pub extremum_min_distance: Period,
  pub spacing_rule: SpacingRule,
  /// Most recent support/resistance levels reported
  pub max_levels: usize,
}

impl Default for AssessmentParams {
  fn default() -> Self {
    Self {
      sma_fast: Period::new_const(50),
      sma_slow: Period::new_const(200),
      rsi_period: Period::new_const(14),
      macd_fast: Period::new_const(12),
      macd_slow: Period::new_const(26),
      macd_signal: Period::new_const(9),
      bollinger_window: Period::new_const(20),
      bollinger_k: 2.0,
      atr_period: Period::new_const(14),
      atr_smoothing: AtrSmoothing::Wilder,
      volatility_window: Period::new_const(20),
      trading_days: Period::new_const(252),
      momentum_period: Period::new_const(20),
      min_bars: Period::new_const(210),
      extremum_order: Period::new_const(1),
      extremum_min_distance: Period::new_const(20),
      spacing_rule: SpacingRule::LeftToRight,
      max_levels: 3,
    }
  }
}

static ASSESSMENT_PARAMS: &[ParamMeta] = &[
  ParamMeta::period("sma_fast", 50.0, (10.0, 100.0, 10.0), "Fast simple moving average window"),
  ParamMeta::period("sma_slow", 200.0, (100.0, 300.0, 50.0), "Slow simple moving average window"),
  ParamMeta::period("rsi_period", 14.0, (7.0, 28.0, 7.0), "Relative strength window"),
  ParamMeta::period("macd_fast", 12.0, (6.0, 18.0, 3.0), "Short EMA span of the trend difference"),
  ParamMeta::period("macd_slow", 26.0, (20.0, 40.0, 2.0), "Long EMA span of the trend difference"),
  ParamMeta::period("macd_signal", 9.0, (5.0, 15.0, 1.0), "Signal line EMA span"),
  ParamMeta::period("bollinger_window", 20.0, (10.0, 30.0, 5.0), "Band moving average window"),
  ParamMeta::real("bollinger_k", 2.0, (1.0, 3.0, 0.5), "Band width in standard deviations"),
  ParamMeta::period("atr_period", 14.0, (7.0, 28.0, 7.0), "Average true range window"),
  ParamMeta::period("volatility_window", 20.0, (10.0, 60.0, 10.0), "Realized volatility window"),
  ParamMeta::period("trading_days", 252.0, (250.0, 365.0, 1.0), "Annualization factor"),
  ParamMeta::period("momentum_period", 20.0, (5.0, 60.0, 5.0), "Momentum delta lag"),
  ParamMeta::period("min_bars", 210.0, (200.0, 1260.0, 10.0), "Minimum input length"),
  ParamMeta::period("extremum_order", 1.0, (1.0, 10.0, 1.0), "Extremum neighbourhood half-width"),
  ParamMeta::period(
    "extremum_min_distance",
    20.0,
    (5.0, 60.0, 5.0),
    "Minimum spacing between extrema of one kind",
  ),
];

impl AssessmentParams {
  /// Returns metadata for all numeric parameters
  pub fn param_meta() -> &'static [ParamMeta] {
    ASSESSMENT_PARAMS
  }

  /// Builds parameters from a HashMap of overrides, validating the result.
  ///
  /// Missing keys keep their defaults; the enum-valued settings always keep
  /// their defaults.
  pub fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    let d = Self::default();
    let out = Self {
      sma_fast: get_period(params, "sma_fast", d.sma_fast.get())?,
      sma_slow: get_period(params, "sma_slow", d.sma_slow.get())?,
      rsi_period: get_period(params, "rsi_period", d.rsi_period.get())?,
      macd_fast: get_period(params, "macd_fast", d.macd_fast.get())?,
      macd_slow: get_period(params, "macd_slow", d.macd_slow.get())?,
      macd_signal: get_period(params, "macd_signal", d.macd_signal.get())?,
      bollinger_window: get_period(params, "bollinger_window", d.bollinger_window.get())?,
      bollinger_k: get_real(params, "bollinger_k", d.bollinger_k)?,
      atr_period: get_period(params, "atr_period", d.atr_period.get())?,
      volatility_window: get_period(params, "volatility_window", d.volatility_window.get())?,
      trading_days: get_period(params, "trading_days", d.trading_days.get())?,
      momentum_period: get_period(params, "momentum_period", d.momentum_period.get())?,
      min_bars: get_period(params, "min_bars", d.min_bars.get())?,
      extremum_order: get_period(params, "extremum_order", d.extremum_order.get())?,
      extremum_min_distance: get_period(
        params,
        "extremum_min_distance",
        d.extremum_min_distance.get(),
      )?,
      ..d
    };
    out.validate()?;
    Ok(out)
  }

  /// Cross-field consistency checks
  pub fn validate(&self) -> Result<()> {
    if self.sma_fast >= self.sma_slow {
      return Err(AssessmentError::InvalidConfig(format!(
        "sma_fast ({}) must be shorter than sma_slow ({})",
        self.sma_fast.get(),
        self.sma_slow.get()
      )));
    }
    if self.macd_fast >= self.macd_slow {
      return Err(AssessmentError::InvalidConfig(format!(
        "macd_fast ({}) must be shorter than macd_slow ({})",
        self.macd_fast.get(),
        self.macd_slow.get()
      )));
    }
    if self.min_bars < self.sma_slow {
      return Err(AssessmentError::InvalidConfig(format!(
        "min_bars ({}) cannot seat a {}-bar average",
        self.min_bars.get(),
        self.sma_slow.get()
      )));
    }
    if self.volatility_window.get() < 2 {
      return Err(AssessmentError::InvalidConfig(
        "volatility_window needs at least 2 returns".to_string(),
      ));
    }
    if !self.bollinger_k.is_finite() || self.bollinger_k < 0.0 {
      return Err(AssessmentError::OutOfRange {
        field: "bollinger_k",
        value: self.bollinger_k,
        min: 0.0,
        max: f64::MAX,
      });
    }
    if self.max_levels == 0 {
      return Err(AssessmentError::InvalidConfig("max_levels must be > 0".to_string()));
    }
    Ok(())
  }

  /// Index of the first bar at which every indicator is defined on a gap-free
  /// series, i.e. the number of leading rows the cleaning stage drops.
  pub fn warm_up(&self) -> usize {
    [
      self.sma_fast.get() - 1,
      self.sma_slow.get() - 1,
      self.rsi_period.get() - 1,
      self.macd_slow.get().max(self.macd_fast.get()) + self.macd_signal.get() - 2,
      self.bollinger_window.get() - 1,
      self.atr_period.get() - 1,
      self.volatility_window.get(),
      self.momentum_period.get(),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
  }
}

// ============================================================
// TESTS
// ============================================================
