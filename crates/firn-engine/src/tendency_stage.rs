//! Tendency stage: local evaluation, halo exchange, stability reductions.
//!
//! The stage is split into a purely local traversal followed by the
//! step's collective calls. Ordering is load-bearing: every partition's
//! tendency must be fully computed before the exchange is issued, and
//! the exchange must complete before any prognostic update begins, or
//! boundary cells see stale rates.

use std::time::Instant;

use firn_core::{FieldTag, StepConfig, StepErrorKind, StepErrors};
use firn_mesh::{Domain, Partition};
use firn_tendency::TendencyEvaluator;

use crate::exchange::exchange_halo;
use crate::metrics::StepMetrics;

/// Rank-indicator sentinel for ranks not holding the minimum bound.
const NOT_LIMITING: i64 = -1;

/// Run the tendency stage for one step.
///
/// Per partition: reset the tendency buffer, call the evaluator on the
/// frozen old level, record the local stability bound. Evaluator
/// failures merge into the returned set as [`StepErrorKind::Tendency`]
/// and never short-circuit the traversal. After all partitions, exactly
/// one halo exchange of the tendency field runs — unconditionally, so a
/// rank with a failed partition still meets its peers in the collective.
/// When the verbose flag is set (identically on every rank), one
/// min-reduction finds the binding bound and one max-reduction the
/// limiting rank; both always execute as a pair.
pub fn compute_tendencies(
    domain: &mut Domain,
    evaluator: &dyn TendencyEvaluator,
    config: &StepConfig,
    dt: f64,
    metrics: &mut StepMetrics,
) -> StepErrors {
    let mut errors = StepErrors::none();

    // Local traversal: no communication in this loop.
    let local_start = Instant::now();
    let mut local_bound = f64::INFINITY;
    for partition in domain.partitions_mut() {
        let Partition {
            id,
            mesh,
            state,
            tendency,
            ..
        } = partition;
        tendency.reset();
        match evaluator.evaluate(mesh, state.level(firn_core::TimeLevel::Old), dt, tendency) {
            Ok(bound) => {
                tendency.allowable_dt = bound;
                local_bound = local_bound.min(bound);
            }
            Err(reason) => {
                errors.insert(StepErrorKind::Tendency);
                metrics.failures.push(format!(
                    "tendency evaluator '{}' failed on partition {id}: {reason}",
                    evaluator.name()
                ));
            }
        }
    }
    metrics.tendency_us = local_start.elapsed().as_micros() as u64;

    // One exchange for the whole rank, error state notwithstanding.
    let halo_start = Instant::now();
    if let Err(reason) = exchange_halo(domain, FieldTag::LayerThicknessTendency) {
        errors.insert(StepErrorKind::HaloExchange);
        metrics
            .failures
            .push(format!("tendency halo exchange failed: {reason}"));
    }
    metrics.halo_us = halo_start.elapsed().as_micros() as u64;

    if config.verbose_stability_diagnostics {
        let reduction_start = Instant::now();
        let comm = domain.comm();

        // Both reductions always run as a pair; a failed min still
        // leaves the peers waiting in the max.
        let min_result = comm.min_f64(local_bound);
        let global_bound = *min_result.as_ref().unwrap_or(&local_bound);
        let indicator = if local_bound <= global_bound {
            i64::from(comm.rank())
        } else {
            NOT_LIMITING
        };
        let max_result = comm.max_i64(indicator);

        if let Err(reason) = &min_result {
            errors.insert(StepErrorKind::Reduction);
            metrics
                .failures
                .push(format!("stability min-reduction failed: {reason}"));
        }
        match max_result {
            Ok(rank) if rank >= 0 => {
                metrics.limiting_rank = Some(rank as u32);
            }
            Ok(_) => {}
            Err(reason) => {
                errors.insert(StepErrorKind::Reduction);
                metrics
                    .failures
                    .push(format!("stability max-reduction failed: {reason}"));
            }
        }
        if min_result.is_ok() {
            metrics.global_allowable_dt = Some(global_bound);
        }
        metrics.reduction_us = reduction_start.elapsed().as_micros() as u64;
    }

    errors
}
