//! Benchmark Options
//!
//! `warm_ups` and `runs`, set at registry level as defaults and per case as
//! overrides. Validation happens when options are registered, never mid-run.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Iterations discarded before measurement when nothing else is configured
pub const DEFAULT_WARM_UPS: u64 = 100;

/// Measured iterations when nothing else is configured
pub const DEFAULT_RUNS: u64 = 100;

/// An untyped numeric option as it arrives from a config file or other loose source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Whole number
    Integer(i64),
    /// Floating point number
    Float(f64),
}

impl OptionValue {
    /// The value as an iteration count, if it is a non-negative integer
    pub fn as_count(self) -> Option<u64> {
        match self {
            OptionValue::Integer(n) => u64::try_from(n).ok(),
            OptionValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Integer(n) => write!(f, "{n}"),
            OptionValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Integer(n)
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}

impl From<u64> for OptionValue {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => OptionValue::Integer(n),
            Err(_) => OptionValue::Float(n as f64),
        }
    }
}

/// Per-registry defaults or per-case overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkOptions {
    /// Iterations run and discarded before measurement
    pub warm_ups: Option<u64>,
    /// Iterations measured; at least 1
    pub runs: Option<u64>,
}

impl BenchmarkOptions {
    /// No overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the warm-up count
    pub fn warm_ups(mut self, warm_ups: u64) -> Self {
        self.warm_ups = Some(warm_ups);
        self
    }

    /// Set the measured run count
    pub fn runs(mut self, runs: u64) -> Self {
        self.runs = Some(runs);
        self
    }

    /// Build options from loosely typed numbers, validating both.
    ///
    /// `warm_ups` must be a non-negative integer and `runs` a positive integer.
    pub fn from_raw(
        warm_ups: Option<OptionValue>,
        runs: Option<OptionValue>,
    ) -> Result<Self, ValidationError> {
        let warm_ups = warm_ups
            .map(|value| {
                value
                    .as_count()
                    .ok_or(ValidationError::InvalidWarmUps { value })
            })
            .transpose()?;
        let runs = runs
            .map(|value| {
                value
                    .as_count()
                    .ok_or(ValidationError::InvalidRuns { value })
            })
            .transpose()?;

        let options = Self { warm_ups, runs };
        options.validate()?;
        Ok(options)
    }

    /// Check the constraints the type system cannot express
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.runs == Some(0) {
            return Err(ValidationError::InvalidRuns {
                value: OptionValue::Integer(0),
            });
        }
        Ok(())
    }

    /// Fill unset fields from `defaults`
    pub fn resolve(&self, defaults: &ResolvedOptions) -> ResolvedOptions {
        ResolvedOptions {
            warm_ups: self.warm_ups.unwrap_or(defaults.warm_ups),
            runs: self.runs.unwrap_or(defaults.runs),
        }
    }
}

/// Effective options with every field decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOptions {
    /// Iterations run and discarded before measurement
    pub warm_ups: u64,
    /// Iterations measured
    pub runs: u64,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            warm_ups: DEFAULT_WARM_UPS,
            runs: DEFAULT_RUNS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_override() {
        let defaults = ResolvedOptions {
            warm_ups: 500,
            runs: 1000,
        };

        let resolved = BenchmarkOptions::new().runs(2000).resolve(&defaults);
        assert_eq!(resolved.warm_ups, 500);
        assert_eq!(resolved.runs, 2000);

        let resolved = BenchmarkOptions::new().resolve(&ResolvedOptions::default());
        assert_eq!(resolved.warm_ups, DEFAULT_WARM_UPS);
        assert_eq!(resolved.runs, DEFAULT_RUNS);
    }

    #[test]
    fn test_zero_runs_rejected() {
        let err = BenchmarkOptions::new().runs(0).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRuns { .. }));
        assert!(BenchmarkOptions::new().warm_ups(0).runs(1).validate().is_ok());
    }

    #[test]
    fn test_from_raw_rejects_negative_and_fractional() {
        let err = BenchmarkOptions::from_raw(Some((-1i64).into()), None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidWarmUps {
                value: OptionValue::Integer(-1)
            }
        );

        let err = BenchmarkOptions::from_raw(None, Some(1.5f64.into())).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRuns { .. }));

        let err = BenchmarkOptions::from_raw(None, Some(0i64.into())).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRuns { .. }));

        let err = BenchmarkOptions::from_raw(Some(f64::NAN.into()), None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidWarmUps { .. }));
    }

    #[test]
    fn test_from_raw_accepts_integral_floats() {
        let options =
            BenchmarkOptions::from_raw(Some(0i64.into()), Some(2000.0f64.into())).unwrap();
        assert_eq!(options, BenchmarkOptions::new().warm_ups(0).runs(2000));
    }
}
