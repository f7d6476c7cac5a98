//! Per-run step configuration.
//!
//! [`StepConfig`] is built once at startup and threaded explicitly into
//! the orchestrator. Its values must be identical on every rank: the
//! verbosity flag gates collective reduction calls, and a rank-local
//! disagreement would desynchronize the collective call sequence.

use std::error::Error;
use std::fmt;

/// Configuration for the explicit time-integration driver.
///
/// All fields are process-invariant: the same configuration must be
/// handed to every rank of a run. In particular
/// [`verbose_stability_diagnostics`](Self::verbose_stability_diagnostics)
/// decides whether the tendency stage issues its min/max reduction pair,
/// and that decision must be made identically everywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct StepConfig {
    /// Emit the extra stability/extent diagnostics.
    ///
    /// When `true`, each step performs one global min-reduction over the
    /// local stability bounds and one max-reduction to identify the
    /// CFL-limiting rank, and records clamped-cell and ice-extent counts.
    /// When `false`, that path is skipped entirely on every rank.
    pub verbose_stability_diagnostics: bool,

    /// Default step size in seconds, used when the caller passes no
    /// explicit `dt` to a convenience entry point.
    pub default_dt: f64,
}

impl StepConfig {
    /// A quiet configuration with the given default step size.
    pub fn new(default_dt: f64) -> Self {
        Self {
            verbose_stability_diagnostics: false,
            default_dt,
        }
    }

    /// Enable the verbose stability/extent diagnostics path.
    pub fn with_verbose_diagnostics(mut self) -> Self {
        self.verbose_stability_diagnostics = true;
        self
    }

    /// Check structural invariants of the configuration.
    ///
    /// The step size must be finite and strictly positive; an explicit
    /// Euler step with a zero or negative `dt` is a driver misuse, not a
    /// numerical failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_dt.is_finite() || self.default_dt <= 0.0 {
            return Err(ConfigError::InvalidDt {
                dt: self.default_dt,
            });
        }
        Ok(())
    }
}

/// Errors from [`StepConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The default step size is not finite and strictly positive.
    InvalidDt {
        /// The offending value.
        dt: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDt { dt } => {
                write!(f, "default dt must be finite and positive, got {dt}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        assert!(StepConfig::new(3600.0).validate().is_ok());
    }

    #[test]
    fn zero_dt_rejected() {
        let err = StepConfig::new(0.0).validate().unwrap_err();
        assert_eq!(err, ConfigError::InvalidDt { dt: 0.0 });
    }

    #[test]
    fn nan_dt_rejected() {
        assert!(StepConfig::new(f64::NAN).validate().is_err());
    }

    #[test]
    fn builder_enables_verbosity() {
        let config = StepConfig::new(1.0).with_verbose_diagnostics();
        assert!(config.verbose_stability_diagnostics);
    }
}
