//! # YATAS - Yet Another Technical Assessment Snapshot
//!
//! Turns a daily OHLC price series into a structured technical-assessment
//! snapshot: trend, momentum and volatility indicators, support/resistance
//! levels and naive chart-pattern flags.
//!
//! The pipeline runs in fixed order: indicators, cleaning (warm-up rows are
//! dropped), structure (peaks/troughs on the cleaned closes), patterns over
//! those extrema, and assembly of the final [`AssessmentRecord`]. The engine is
//! a pure function of (series, parameters); it holds no mutable state and can
//! be shared across threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use yatas::prelude::*;
//!
//! // Define your OHLCV data
//! struct Bar { o: f64, h: f64, l: f64, c: f64, v: f64 }
//!
//! impl OHLCV for Bar {
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//!     fn volume(&self) -> f64 { self.v }
//! }
//!
//! // Create engine with default parameters and every chart pattern
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .build()
//!     .unwrap();
//!
//! // Assess your data
//! let bars: Vec<Bar> = (0..260)
//!     .map(|i| {
//!         let c = 100.0 + (i as f64 * 0.2).sin() * 5.0;
//!         Bar { o: c, h: c + 1.0, l: c - 1.0, c, v: 1000.0 }
//!     })
//!     .collect();
//! let record = engine.assess("DEMO", &bars).unwrap();
//! assert_eq!(record.current_price, bars[259].c);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod indicators;
pub mod loader;
pub mod params;
pub mod patterns;
pub mod record;
pub mod structure;
pub mod table;

pub mod prelude {
    pub use crate::{
        // Parallel
        assess_parallel,
        // Indicators
        indicators::AtrSmoothing,
        // Loader
        loader::{MemoryLoader, SeriesLoader, DEFAULT_LOOKBACK},
        // Parameters
        params::{AssessmentParams, ParamMeta, ParamType, ParameterizedDetector},
        // Patterns
        patterns::{
            BuiltinDetector, ChartPattern, ChartPatternDetector, DoubleBottomDetector,
            DoubleTopDetector, HeadAndShouldersDetector, PatternMatch,
        },
        // Output
        record::AssessmentRecord,
        structure::{Extremum, ExtremumSet, SpacingRule},
        table::{IndicatorColumns, IndicatorRow},
        // Engine
        Analysis,
        AssessmentEngine,
        // Errors
        AssessmentError,
        AssessmentFailure,
        Direction,
        EngineBuilder,
        EngineConfig,
        OHLCVExt,
        Period,
        PriceBar,
        Ratio,
        Result,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AssessmentError>;

/// Errors that can occur during an assessment
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssessmentError {
    #[error("Insufficient data: need {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Indicators could not be computed for {symbol} (try a longer period, e.g. '2y' or '5y')")]
    IndicatorComputationFailed { symbol: String },

    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("Failed to load {symbol}: {reason}")]
    Load { symbol: String, reason: String },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AssessmentError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AssessmentError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AssessmentError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
///
/// A NaN price marks a missing observation; indicators treat it as a gap.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Extension trait with consistency checks for OHLCV data
pub trait OHLCVExt: OHLCV {
    /// Validate OHLCV data consistency. Missing (NaN) prices are allowed.
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(AssessmentError::InvalidBar {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if prices.iter().any(|p| *p <= 0.0) {
            return Err(AssessmentError::InvalidBar {
                index: 0,
                reason: "non-positive price",
            });
        }
        if self.high() < self.low() {
            return Err(AssessmentError::InvalidBar {
                index: 0,
                reason: "high < low",
            });
        }
        if self.volume() < 0.0 {
            return Err(AssessmentError::InvalidBar {
                index: 0,
                reason: "negative volume",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Daily price bar as delivered by a series loader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for PriceBar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume as f64
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

// ============================================================
// ASSESSMENT ENGINE
// ============================================================

use indicators::compute;
use params::AssessmentParams;
use patterns::{detect_all, BuiltinDetector, ChartPattern, PatternMatch};
use record::{assemble, AssessmentRecord};
use structure::ExtremumSet;
use table::{ensure_min_bars, IndicatorColumns, IndicatorRow};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<ChartPattern>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_data: true,
            pattern_filter: None,
        }
    }
}

/// Everything one assessment produced, for callers that chart the series
#[derive(Debug, Clone)]
pub struct Analysis {
    pub record: AssessmentRecord,
    /// Cleaned indicator table, oldest first
    pub rows: Vec<IndicatorRow>,
    pub extrema: ExtremumSet,
    pub patterns: Vec<PatternMatch>,
}

/// Main technical-assessment engine
#[derive(Debug, Clone)]
pub struct AssessmentEngine {
    detectors: Vec<BuiltinDetector>,
    params: AssessmentParams,
    config: EngineConfig,
}

impl Default for AssessmentEngine {
    fn default() -> Self {
        Self {
            detectors: BuiltinDetector::all_defaults(),
            params: AssessmentParams::default(),
            config: EngineConfig::default(),
        }
    }
}

impl AssessmentEngine {
    #[inline]
    pub fn params(&self) -> &AssessmentParams {
        &self.params
    }

    #[inline]
    pub fn detectors(&self) -> &[BuiltinDetector] {
        &self.detectors
    }

    // ===========================================
    // STAGES
    // ===========================================

    /// Indicator stage: one candidate row per input bar.
    #[inline]
    pub fn compute_indicators<T: OHLCV>(&self, bars: &[T]) -> IndicatorColumns {
        compute(bars, &self.params)
    }

    /// Cleaning stage: keeps fully defined rows, failing if none survive.
    pub fn clean(&self, symbol: &str, columns: &IndicatorColumns) -> Result<Vec<IndicatorRow>> {
        let rows = columns.clean();
        if rows.is_empty() {
            return Err(computation_failed(symbol));
        }
        Ok(rows)
    }

    /// Structure stage over a cleaned close series.
    #[inline]
    pub fn detect_extrema(&self, closes: &[f64]) -> ExtremumSet {
        ExtremumSet::detect(
            closes,
            self.params.extremum_order.get(),
            self.params.extremum_min_distance.get(),
            self.params.spacing_rule,
        )
    }

    /// Pattern stage: every configured detector, in order.
    pub fn detect_patterns(&self, extrema: &ExtremumSet) -> Vec<PatternMatch> {
        let mut matches = detect_all(&self.detectors, extrema);
        if let Some(ref filter) = self.config.pattern_filter {
            matches.retain(|m| filter.contains(&m.pattern));
        }
        matches
    }

    // ===========================================
    // PIPELINE
    // ===========================================

    /// Runs the full pipeline and keeps every intermediate result.
    pub fn analyze<T: OHLCV>(&self, symbol: &str, bars: &[T]) -> Result<Analysis> {
        self.run(symbol, bars).inspect_err(|e| {
            warn!(symbol, error = %e, "technical assessment failed");
        })
    }

    /// Runs the full pipeline and returns the snapshot record.
    #[inline]
    pub fn assess<T: OHLCV>(&self, symbol: &str, bars: &[T]) -> Result<AssessmentRecord> {
        self.analyze(symbol, bars).map(|a| a.record)
    }

    /// Loads `symbol` over `lookback` and assesses it. Loader errors pass
    /// through unchanged and are never retried.
    pub fn assess_from<L: loader::SeriesLoader + ?Sized>(
        &self,
        loader: &L,
        symbol: &str,
        lookback: &str,
    ) -> Result<AssessmentRecord> {
        let bars = loader.load(symbol, lookback).inspect_err(|e| {
            warn!(symbol, lookback, error = %e, "series loader failed");
        })?;
        self.assess(symbol, &bars)
    }

    fn run<T: OHLCV>(&self, symbol: &str, bars: &[T]) -> Result<Analysis> {
        ensure_min_bars(self.params.min_bars.get(), bars.len())?;
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        let columns = self.compute_indicators(bars);
        let rows = self.clean(symbol, &columns)?;
        debug!(
            symbol,
            bars = bars.len(),
            rows = rows.len(),
            dropped = bars.len() - rows.len(),
            "cleaned indicator table"
        );

        let extrema = self.detect_extrema(&table::closes(&rows));
        let patterns = self.detect_patterns(&extrema);
        debug!(
            symbol,
            peaks = extrema.peaks.len(),
            troughs = extrema.troughs.len(),
            patterns = patterns.len(),
            "detected structure"
        );

        let last = rows.last().ok_or_else(|| computation_failed(symbol))?;
        let record = assemble(symbol, last, &extrema, &patterns, self.params.max_levels);

        Ok(Analysis {
            record,
            rows,
            extrema,
            patterns,
        })
    }
}

fn computation_failed(symbol: &str) -> AssessmentError {
    AssessmentError::IndicatorComputationFailed {
        symbol: symbol.to_string(),
    }
}

/// Per-bar consistency plus strictly ascending dates.
fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;

    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            AssessmentError::InvalidBar { reason, .. } => {
                AssessmentError::InvalidBar { index: i, reason }
            }
            other => other,
        })?;

        if let Some(date) = bar.date() {
            if previous.is_some_and(|p| date <= p) {
                return Err(AssessmentError::InvalidBar {
                    index: i,
                    reason: "dates not strictly ascending",
                });
            }
            previous = Some(date);
        }
    }

    Ok(())
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating AssessmentEngine instances
///
/// An engine built without any `add`/`with_all_defaults` call runs every
/// builtin chart pattern with default settings.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    detectors: Vec<BuiltinDetector>,
    params: AssessmentParams,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every builtin chart pattern with default configuration
    pub fn with_all_defaults(mut self) -> Self {
        self.detectors.extend(BuiltinDetector::all_defaults());
        self
    }

    /// Replace the pipeline parameters
    pub fn params(mut self, params: AssessmentParams) -> Self {
        self.params = params;
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.detectors.push(detector);
        Ok(self)
    }

    /// Enable/disable input validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Report only these patterns
    pub fn only_patterns(mut self, patterns: impl IntoIterator<Item = ChartPattern>) -> Self {
        self.config.pattern_filter = Some(patterns.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<AssessmentEngine> {
        self.params.validate()?;
        for d in &self.detectors {
            d.validate_config()?;
        }
        let detectors = if self.detectors.is_empty() {
            BuiltinDetector::all_defaults()
        } else {
            self.detectors
        };
        Ok(AssessmentEngine {
            detectors,
            params: self.params,
            config: self.config,
        })
    }
}

// ============================================================
// PARALLEL ASSESSMENT
// ============================================================

use rayon::prelude::*;

/// Error from assessing a single instrument
#[derive(Debug)]
pub struct AssessmentFailure {
    pub symbol: String,
    pub error: AssessmentError,
}

/// Parallel assessment of multiple instruments
pub fn assess_parallel<'a, T, I>(
    engine: &AssessmentEngine,
    instruments: I,
) -> (Vec<AssessmentRecord>, Vec<AssessmentFailure>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .assess(symbol, bars)
                .map_err(|error| AssessmentFailure {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
