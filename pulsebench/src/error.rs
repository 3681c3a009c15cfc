//! Error Types
//!
//! Registration-time problems are [`ValidationError`]s and surface at the call
//! that supplied the bad options. Everything that fails while a case is running
//! is passed through untouched as [`BenchError::Propagated`].

use crate::options::OptionValue;
use thiserror::Error;

/// An option violated its constraint
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `warm_ups` was negative, fractional or not a number
    #[error("`warm_ups` must be a non-negative integer, got {value}")]
    InvalidWarmUps {
        /// The rejected value
        value: OptionValue,
    },

    /// `runs` was zero, negative, fractional or not a number
    #[error("`runs` must be a positive integer, got {value}")]
    InvalidRuns {
        /// The rejected value
        value: OptionValue,
    },
}

/// Error yielded by a benchmark run
#[derive(Debug, Error)]
pub enum BenchError {
    /// Options were rejected.
    ///
    /// Registration validates eagerly, so [`Benchmark::run`](crate::Benchmark::run)
    /// never yields this. It lets callers that build a registry and run it in one
    /// function use `?` on both steps with a single error type.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A factory, hook or iterate call failed; the original error is kept as-is
    #[error(transparent)]
    Propagated(#[from] anyhow::Error),

    /// The measurement phase produced no samples
    #[error("case `{case}` produced no measured samples")]
    EmptyMeasurement {
        /// Name of the case
        case: String,
    },
}

impl BenchError {
    /// The underlying user error, if this failure came from user code
    pub fn as_propagated(&self) -> Option<&anyhow::Error> {
        match self {
            BenchError::Propagated(error) => Some(error),
            _ => None,
        }
    }
}

/// Error loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or has the wrong shape
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configured option violated its constraint
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}
