//! Iteration configuration for the raking engine.

use crate::{RakingError, Result};
use serde::{Deserialize, Serialize};

/// Default maximum number of full raking passes.
pub const DEFAULT_MAX_ITER: usize = 500;

/// Default convergence tolerance, in percentage points.
pub const DEFAULT_TOL: f64 = 0.1;

/// Controls how the raking engine iterates.
///
/// Deserializes from any serde format; absent keys take the defaults.
///
/// # Example
///
/// ```rust
/// use raking_core::IterationConfig;
///
/// let config = IterationConfig::builder()
///     .max_iter(1000)
///     .tol(0.01)
///     .max_weight(5.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_iter, 1000);
/// assert_eq!(config.min_weight, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IterationConfig {
    /// Maximum number of passes over all target columns
    pub max_iter: usize,

    /// Largest acceptable gap (percentage points) between achieved and target margins
    pub tol: f64,

    /// Lower weight bound applied after each column adjustment
    #[serde(alias = "min")]
    pub min_weight: Option<f64>,

    /// Upper weight bound applied after each column adjustment
    #[serde(alias = "max")]
    pub max_weight: Option<f64>,

    /// Fit even when target columns contain missing values
    pub allow_missings: bool,
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            min_weight: None,
            max_weight: None,
            allow_missings: false,
        }
    }
}

impl IterationConfig {
    /// Creates a new builder for `IterationConfig`.
    pub fn builder() -> IterationConfigBuilder {
        IterationConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(RakingError::invalid_config("max_iter must be positive"));
        }

        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(RakingError::invalid_config(format!(
                "tol must be a positive number, got {}",
                self.tol
            )));
        }

        for (name, bound) in [("min", self.min_weight), ("max", self.max_weight)] {
            if let Some(value) = bound {
                if !(value.is_finite() && value > 0.0) {
                    return Err(RakingError::invalid_config(format!(
                        "{name} weight bound must be a positive number, got {value}"
                    )));
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min_weight, self.max_weight) {
            if min > max {
                return Err(RakingError::invalid_config(format!(
                    "min weight bound {min} exceeds max weight bound {max}"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`IterationConfig`].
#[derive(Debug, Default)]
pub struct IterationConfigBuilder {
    config: IterationConfig,
}

impl IterationConfigBuilder {
    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: IterationConfig) -> Self {
        Self { config }
    }

    /// Sets the maximum number of passes.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance in percentage points.
    pub fn tol(mut self, tol: f64) -> Self {
        self.config.tol = tol;
        self
    }

    /// Sets the lower weight bound.
    pub fn min_weight(mut self, min: f64) -> Self {
        self.config.min_weight = Some(min);
        self
    }

    /// Sets the upper weight bound.
    pub fn max_weight(mut self, max: f64) -> Self {
        self.config.max_weight = Some(max);
        self
    }

    /// Allows fitting with missing values in target columns.
    pub fn allow_missings(mut self, allow: bool) -> Self {
        self.config.allow_missings = allow;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<IterationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
