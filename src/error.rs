//! Configuration errors.
//!
//! Nothing inside a planning or control tick fails; the only fallible boundary
//! is accepting a set of parameters.

use thiserror::Error;

/// A rejected parameter record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("arena must have positive dimensions, got {width} x {height}")]
    Arena { width: f64, height: f64 },

    #[error("`{name}` must be {requirement}, got {value}")]
    Parameter {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("{what} at ({x}, {y}) lies outside the arena")]
    OutOfBounds { what: &'static str, x: f64, y: f64 },
}

impl ConfigError {
    /// Checks that `value` is finite and strictly positive.
    pub(crate) fn positive(name: &'static str, value: f64) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Parameter {
                name,
                requirement: "positive",
                value,
            })
        }
    }

    /// Checks that `value` is finite and not negative.
    pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<()> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Parameter {
                name,
                requirement: "non-negative",
                value,
            })
        }
    }

    /// Checks that `value` is a probability.
    pub(crate) fn probability(name: &'static str, value: f64) -> Result<()> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::Parameter {
                name,
                requirement: "within [0, 1]",
                value,
            })
        }
    }

    /// Checks that a count is at least one.
    pub(crate) fn nonzero(name: &'static str, value: usize) -> Result<()> {
        if value > 0 {
            Ok(())
        } else {
            Err(ConfigError::Parameter {
                name,
                requirement: "at least 1",
                value: value as f64,
            })
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
