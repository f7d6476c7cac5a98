//! The forward-Euler step orchestrator.

use std::fmt;
use std::time::Instant;

use firn_core::{StepConfig, StepErrorKind, StepErrors, StepId, TimeLevel};
use firn_mesh::{Domain, Partition};
use firn_tendency::{DiagnosticsSolver, TendencyEvaluator};

use crate::metrics::StepMetrics;
use crate::tendency_stage::compute_tendencies;
use crate::update_stage::advance_prognostics;

/// Result of one step, successful or not.
///
/// A step always runs to completion — every partition visited, every
/// collective executed — so there is no early-exit error type. The
/// [`errors`](Self::errors) set is empty on success; on failure the
/// `Display` impl renders a human-readable report identifying the
/// failing stages. State is left exactly as the stages produced it:
/// no rollback. The abort/continue decision belongs to the caller.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    /// The step this outcome describes.
    pub step: StepId,
    /// Union of every failure fired across the three stages.
    pub errors: StepErrors,
    /// Timing and diagnostic data for the step.
    pub metrics: StepMetrics,
}

impl StepOutcome {
    /// Whether the step completed without any failure.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            write!(f, "step {} ok", self.step)?;
        } else {
            write!(f, "step {} failed: {}", self.step, self.errors)?;
            for failure in &self.metrics.failures {
                write!(f, "\n  {failure}")?;
            }
        }
        if let Some(report) = self.metrics.stability_report() {
            write!(f, "\n  {report}")?;
        }
        Ok(())
    }
}

/// Explicit forward-Euler time integrator.
///
/// Owns the two collaborator seams and the run configuration; the
/// caller owns the [`Domain`]. Each [`step`](Self::step) advances every
/// partition by exactly one explicit step in strict stage order:
///
/// 1. Tendency stage — local evaluation, one halo exchange, optional
///    stability reductions.
/// 2. Prognostic update stage — Euler advance, column totals,
///    non-negativity clamp.
/// 3. Diagnostic recomputation on the new time level of every partition.
///
/// Errors from the three stages merge by set union into the outcome.
/// Swapping the time levels afterwards is the caller's move
/// ([`Domain::advance_time_levels`]), typically only when the outcome is
/// acceptable to continue from.
pub struct ForwardEulerStep {
    evaluator: Box<dyn TendencyEvaluator>,
    diagnostics: Box<dyn DiagnosticsSolver>,
    config: StepConfig,
    current_step: StepId,
}

impl ForwardEulerStep {
    /// Build a driver from its collaborators and a validated config.
    pub fn new(
        evaluator: Box<dyn TendencyEvaluator>,
        diagnostics: Box<dyn DiagnosticsSolver>,
        config: StepConfig,
    ) -> Result<Self, firn_core::ConfigError> {
        config.validate()?;
        Ok(Self {
            evaluator,
            diagnostics,
            config,
            current_step: StepId(0),
        })
    }

    /// The configuration this driver runs with.
    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    /// Advance the domain by one explicit step of size `dt` seconds.
    pub fn step(&mut self, domain: &mut Domain, dt: f64) -> StepOutcome {
        let start = Instant::now();
        let mut metrics = StepMetrics::default();
        let mut errors = StepErrors::none();

        errors.merge(compute_tendencies(
            domain,
            self.evaluator.as_ref(),
            &self.config,
            dt,
            &mut metrics,
        ));
        errors.merge(advance_prognostics(domain, &self.config, dt, &mut metrics));
        errors.merge(self.recompute_diagnostics(domain, &mut metrics));

        metrics.total_us = start.elapsed().as_micros() as u64;
        self.current_step = StepId(self.current_step.0 + 1);
        StepOutcome {
            step: self.current_step,
            errors,
            metrics,
        }
    }

    /// Advance by the configured default step size.
    pub fn step_default(&mut self, domain: &mut Domain) -> StepOutcome {
        let dt = self.config.default_dt;
        self.step(domain, dt)
    }

    /// Stage 3: diagnostic recomputation on the new level, every
    /// partition, failures accumulated.
    fn recompute_diagnostics(
        &self,
        domain: &mut Domain,
        metrics: &mut StepMetrics,
    ) -> StepErrors {
        let start = Instant::now();
        let mut errors = StepErrors::none();
        for partition in domain.partitions_mut() {
            let Partition {
                id, mesh, state, ..
            } = partition;
            if let Err(reason) = self
                .diagnostics
                .recompute(mesh, state.level_mut(TimeLevel::New))
            {
                errors.insert(StepErrorKind::Diagnostics);
                metrics.failures.push(format!(
                    "diagnostics solver '{}' failed on partition {id}: {reason}",
                    self.diagnostics.name()
                ));
            }
        }
        metrics.diagnostics_us = start.elapsed().as_micros() as u64;
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firn_comm::LocalComm;
    use firn_core::PartitionId;
    use firn_mesh::{HaloMap, Mesh};
    use firn_state::{StateLevel, Tendency};
    use firn_tendency::{DiagnosticsError, TendencyError};

    struct Steady;

    impl TendencyEvaluator for Steady {
        fn name(&self) -> &str {
            "steady"
        }

        fn evaluate(
            &self,
            _mesh: &Mesh,
            _state: &StateLevel,
            _dt: f64,
            _tendency: &mut Tendency,
        ) -> Result<f64, TendencyError> {
            Ok(f64::INFINITY)
        }
    }

    struct NoopDiagnostics;

    impl DiagnosticsSolver for NoopDiagnostics {
        fn name(&self) -> &str {
            "noop"
        }

        fn recompute(
            &self,
            _mesh: &Mesh,
            _state: &mut StateLevel,
        ) -> Result<(), DiagnosticsError> {
            Ok(())
        }
    }

    struct FailingDiagnostics;

    impl DiagnosticsSolver for FailingDiagnostics {
        fn name(&self) -> &str {
            "velocity_solver"
        }

        fn recompute(
            &self,
            _mesh: &Mesh,
            _state: &mut StateLevel,
        ) -> Result<(), DiagnosticsError> {
            Err(DiagnosticsError::NotConverged { iterations: 50 })
        }
    }

    fn single_cell_domain() -> Domain {
        let mesh = Mesh::uniform(1, 0, 1).unwrap();
        let partition = Partition::new(PartitionId(0), mesh, HaloMap::isolated());
        Domain::new(vec![partition], Box::new(LocalComm::new()))
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let result = ForwardEulerStep::new(
            Box::new(Steady),
            Box::new(NoopDiagnostics),
            StepConfig::new(-1.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn step_ids_are_monotonic() {
        let mut driver = ForwardEulerStep::new(
            Box::new(Steady),
            Box::new(NoopDiagnostics),
            StepConfig::new(1.0),
        )
        .unwrap();
        let mut domain = single_cell_domain();
        assert_eq!(driver.step(&mut domain, 1.0).step, StepId(1));
        assert_eq!(driver.step_default(&mut domain).step, StepId(2));
    }

    #[test]
    fn diagnostics_failure_surfaces_in_outcome() {
        let mut driver = ForwardEulerStep::new(
            Box::new(Steady),
            Box::new(FailingDiagnostics),
            StepConfig::new(1.0),
        )
        .unwrap();
        let mut domain = single_cell_domain();
        let outcome = driver.step(&mut domain, 1.0);
        assert!(!outcome.is_ok());
        assert!(outcome.errors.contains(StepErrorKind::Diagnostics));
        let report = outcome.to_string();
        assert!(report.contains("velocity_solver"));
        assert!(report.contains("did not converge"));
    }

    #[test]
    fn successful_outcome_displays_ok() {
        let mut driver = ForwardEulerStep::new(
            Box::new(Steady),
            Box::new(NoopDiagnostics),
            StepConfig::new(1.0),
        )
        .unwrap();
        let mut domain = single_cell_domain();
        let outcome = driver.step(&mut domain, 1.0);
        assert!(outcome.is_ok());
        assert_eq!(outcome.to_string(), "step 1 ok");
    }
}
