//! Per-step metrics and the stability report.
//!
//! [`StepMetrics`] captures timing and diagnostic data for a single
//! step. The driver populates it as the stages run; callers read it from
//! the returned [`StepOutcome`](crate::StepOutcome). There is no logging
//! layer: observability is this struct plus its `Display` helpers.

use std::fmt;
use std::time::Duration;

/// Timing and diagnostic metrics collected during a single step.
///
/// All durations are in microseconds. Diagnostic counters cover owned
/// cells only (ghost copies would double-count across partitions).
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Time spent in local tendency evaluation, in microseconds.
    pub tendency_us: u64,
    /// Time spent in the tendency halo exchange, in microseconds.
    pub halo_us: u64,
    /// Time spent in the stability reductions, in microseconds.
    pub reduction_us: u64,
    /// Time spent in the prognostic update loop, in microseconds.
    pub update_us: u64,
    /// Time spent in diagnostic recomputation, in microseconds.
    pub diagnostics_us: u64,
    /// Owned cells whose column total went negative and was clamped to
    /// zero. Nonzero means the step size exceeded the stability bound or
    /// a forcing term out-massed an entire column.
    pub clamped_cells: u64,
    /// Owned cells with strictly positive ice thickness after the update.
    pub ice_extent_cells: u64,
    /// Globally binding stability bound, when the verbose diagnostics
    /// path ran.
    pub global_allowable_dt: Option<f64>,
    /// Rank holding the binding bound, when the verbose path ran.
    pub limiting_rank: Option<u32>,
    /// Human-readable failure descriptions accumulated across stages.
    pub failures: Vec<String>,
}

impl StepMetrics {
    /// The stability report for this step, if the verbose path ran.
    pub fn stability_report(&self) -> Option<StabilityReport> {
        self.global_allowable_dt.map(|dt| StabilityReport {
            allowable_dt: dt,
            limiting_rank: self.limiting_rank,
        })
    }
}

/// Formats the globally binding stability bound as a duration, with the
/// CFL-limiting rank when known.
///
/// ```
/// use firn_engine::StabilityReport;
///
/// let report = StabilityReport { allowable_dt: 90.5, limiting_rank: Some(3) };
/// assert_eq!(report.to_string(), "allowable dt 90.5s, limited by rank 3");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityReport {
    /// The globally binding allowable step size, in seconds.
    pub allowable_dt: f64,
    /// Rank holding the minimum, if the tie-break reduction succeeded.
    pub limiting_rank: Option<u32>,
}

impl fmt::Display for StabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.allowable_dt.is_finite() {
            let dur = Duration::from_secs_f64(self.allowable_dt.max(0.0));
            write!(f, "allowable dt {:?}", dur)?;
        } else {
            write!(f, "allowable dt unconstrained")?;
        }
        if let Some(rank) = self.limiting_rank {
            write!(f, ", limited by rank {rank}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.clamped_cells, 0);
        assert!(m.global_allowable_dt.is_none());
        assert!(m.failures.is_empty());
        assert!(m.stability_report().is_none());
    }

    #[test]
    fn finite_bound_formats_as_duration() {
        let report = StabilityReport {
            allowable_dt: 90.5,
            limiting_rank: Some(3),
        };
        assert_eq!(report.to_string(), "allowable dt 90.5s, limited by rank 3");
    }

    #[test]
    fn infinite_bound_reads_unconstrained() {
        let report = StabilityReport {
            allowable_dt: f64::INFINITY,
            limiting_rank: None,
        };
        assert_eq!(report.to_string(), "allowable dt unconstrained");
    }
}
