//! Prognostic update stage: explicit Euler advance and invariant
//! enforcement.
//!
//! Purely local — no communication. For each partition the new time
//! level is produced from the frozen old level and the synchronized
//! tendency; the column total is re-derived as the sum over layers, and
//! any cell whose total goes negative is clamped to exactly zero (layers
//! included, keeping the column-sum invariant intact).

use std::time::Instant;

use firn_core::{StepConfig, StepErrors};
use firn_mesh::{Domain, Partition};

use crate::metrics::StepMetrics;

/// Advance every partition's prognostic state by one explicit Euler step.
///
/// For every cell `c` and active layer `k`:
///
/// ```text
/// layer_thickness_new[c,k] = layer_thickness_old[c,k] + tendency[c,k] * dt
/// thickness_new[c]         = sum over k of layer_thickness_new[c,k]
/// ```
///
/// A negative column total should never occur under a respected
/// stability bound; when it does, the cell is zeroed and counted in
/// [`StepMetrics::clamped_cells`]. Counters cover owned cells only.
///
/// The stage currently has no failure modes of its own; it still
/// returns a [`StepErrors`] accumulator because the orchestrator merges
/// one per stage.
pub fn advance_prognostics(
    domain: &mut Domain,
    config: &StepConfig,
    dt: f64,
    metrics: &mut StepMetrics,
) -> StepErrors {
    let start = Instant::now();
    let mut clamped: u64 = 0;
    let mut extent: u64 = 0;

    for partition in domain.partitions_mut() {
        let Partition {
            mesh,
            state,
            tendency,
            ..
        } = partition;
        let max_levels = mesh.max_levels();
        let (old, new) = state.split();

        for cell in 0..mesh.cell_count() {
            let active = mesh.active_levels(cell);
            let base = cell * max_levels;
            let mut column_total = 0.0;
            for k in 0..max_levels {
                let idx = base + k;
                let value = if k < active {
                    old.layer_thickness[idx] + tendency.layer_thickness[idx] * dt
                } else {
                    0.0
                };
                new.layer_thickness[idx] = value;
                column_total += value;
            }
            if column_total < 0.0 {
                new.layer_thickness[base..base + max_levels].fill(0.0);
                column_total = 0.0;
                if cell < mesh.owned_cells() {
                    clamped += 1;
                }
            }
            new.thickness[cell] = column_total;
            if column_total > 0.0 && cell < mesh.owned_cells() {
                extent += 1;
            }
        }
    }

    metrics.clamped_cells = clamped;
    if config.verbose_stability_diagnostics {
        metrics.ice_extent_cells = extent;
    }
    metrics.update_us = start.elapsed().as_micros() as u64;
    StepErrors::none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use firn_comm::LocalComm;
    use firn_core::{PartitionId, TimeLevel};
    use firn_mesh::{HaloMap, Mesh};

    fn domain_with_column(thickness_per_layer: &[f64], rates: &[f64]) -> Domain {
        let levels = thickness_per_layer.len();
        let mesh = Mesh::uniform(1, 0, levels).unwrap();
        let mut partition = Partition::new(PartitionId(0), mesh, HaloMap::isolated());
        partition
            .state
            .level_mut(TimeLevel::Old)
            .column_mut(0, levels)
            .copy_from_slice(thickness_per_layer);
        partition.state.level_mut(TimeLevel::Old).thickness[0] =
            thickness_per_layer.iter().sum();
        partition.tendency.column_mut(0).copy_from_slice(rates);
        Domain::new(vec![partition], Box::new(LocalComm::new()))
    }

    #[test]
    fn euler_update_advances_layers() {
        let mut domain = domain_with_column(&[10.0], &[-2.0]);
        let mut metrics = StepMetrics::default();
        advance_prognostics(&mut domain, &StepConfig::new(1.0), 1.0, &mut metrics);

        let new = domain.partitions()[0].state.level(TimeLevel::New);
        assert_eq!(new.layer_thickness[0], 8.0);
        assert_eq!(new.thickness[0], 8.0);
        assert_eq!(metrics.clamped_cells, 0);
    }

    #[test]
    fn negative_column_is_clamped_and_counted() {
        let mut domain = domain_with_column(&[10.0], &[-20.0]);
        let mut metrics = StepMetrics::default();
        advance_prognostics(&mut domain, &StepConfig::new(1.0), 1.0, &mut metrics);

        let new = domain.partitions()[0].state.level(TimeLevel::New);
        assert_eq!(new.thickness[0], 0.0);
        assert_eq!(new.layer_thickness[0], 0.0);
        assert_eq!(metrics.clamped_cells, 1);
    }

    #[test]
    fn column_total_is_sum_over_layers() {
        let mut domain = domain_with_column(&[4.0, 3.0, 1.0], &[0.5, -1.0, 0.25]);
        let mut metrics = StepMetrics::default();
        advance_prognostics(&mut domain, &StepConfig::new(1.0), 2.0, &mut metrics);

        let new = domain.partitions()[0].state.level(TimeLevel::New);
        let expected: f64 = new.column(0, 3).iter().sum();
        assert_eq!(new.thickness[0], expected);
        assert_eq!(new.column(0, 3), &[5.0, 1.0, 1.5]);
    }

    #[test]
    fn inactive_layers_stay_zero() {
        let mesh = Mesh::new(1, 0, vec![1], vec![0.5, 0.5]).unwrap();
        let mut partition = Partition::new(PartitionId(0), mesh, HaloMap::isolated());
        partition.state.level_mut(TimeLevel::Old).layer_thickness[0] = 6.0;
        partition.tendency.layer_thickness[1] = 99.0; // inactive layer noise
        let mut domain = Domain::new(vec![partition], Box::new(LocalComm::new()));

        let mut metrics = StepMetrics::default();
        advance_prognostics(&mut domain, &StepConfig::new(1.0), 1.0, &mut metrics);

        let new = domain.partitions()[0].state.level(TimeLevel::New);
        assert_eq!(new.column(0, 2), &[6.0, 0.0]);
        assert_eq!(new.thickness[0], 6.0);
    }

    #[test]
    fn extent_counts_only_under_verbose_flag() {
        let mut domain = domain_with_column(&[10.0], &[0.0]);
        let mut metrics = StepMetrics::default();
        advance_prognostics(&mut domain, &StepConfig::new(1.0), 1.0, &mut metrics);
        assert_eq!(metrics.ice_extent_cells, 0);

        let mut domain = domain_with_column(&[10.0], &[0.0]);
        let mut metrics = StepMetrics::default();
        advance_prognostics(
            &mut domain,
            &StepConfig::new(1.0).with_verbose_diagnostics(),
            1.0,
            &mut metrics,
        );
        assert_eq!(metrics.ice_extent_cells, 1);
    }
}
