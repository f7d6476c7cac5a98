//! Firn quickstart — a complete, minimal thickness evolution from scratch.
//!
//! Demonstrates:
//!   1. Building a mesh partition and a single-rank domain
//!   2. Implementing a tendency evaluator (surface mass balance with a
//!      CFL-style bound) and a diagnostics solver
//!   3. Constructing the forward-Euler driver
//!   4. Stepping, reading outcomes, and swapping time levels
//!
//! Run with:
//!   cargo run --example quickstart

use firn_comm::LocalComm;
use firn_core::{PartitionId, StepConfig, TimeLevel};
use firn_engine::ForwardEulerStep;
use firn_mesh::{Domain, HaloMap, Mesh, Partition};
use firn_state::{StateLevel, Tendency};
use firn_tendency::{
    DiagnosticsError, DiagnosticsSolver, TendencyError, TendencyEvaluator,
};

// ─── Domain parameters ──────────────────────────────────────────

const CELLS: usize = 16;
const LEVELS: usize = 4;
const DT: f64 = 3600.0; // one hour, in seconds

// Uniform accumulation over the first half of the domain, ablation
// over the second half, in meters per second of ice equivalent.
const ACCUMULATION: f64 = 1.0e-6;
const ABLATION: f64 = -2.0e-6;

// ─── Tendency: surface mass balance ─────────────────────────────

struct MassBalance;

impl TendencyEvaluator for MassBalance {
    fn name(&self) -> &str {
        "mass_balance"
    }

    fn evaluate(
        &self,
        mesh: &Mesh,
        state: &StateLevel,
        _dt: f64,
        tendency: &mut Tendency,
    ) -> Result<f64, TendencyError> {
        let mut allowable_dt = f64::INFINITY;
        for cell in 0..mesh.owned_cells() {
            let rate = if cell < mesh.owned_cells() / 2 {
                ACCUMULATION
            } else {
                ABLATION
            };
            // Spread the column rate over the active layers.
            let active = mesh.active_levels(cell);
            for (k, slot) in tendency.column_mut(cell)[..active].iter_mut().enumerate() {
                *slot = rate * mesh.layer_fractions()[k];
            }
            // Stability: do not remove more than a full column per step.
            if rate < 0.0 && state.thickness[cell] > 0.0 {
                allowable_dt = allowable_dt.min(state.thickness[cell] / -rate);
            }
        }
        Ok(allowable_dt)
    }
}

// ─── Diagnostics: surface elevation ─────────────────────────────

struct SurfaceElevation;

impl DiagnosticsSolver for SurfaceElevation {
    fn name(&self) -> &str {
        "surface_elevation"
    }

    fn recompute(&self, mesh: &Mesh, state: &mut StateLevel) -> Result<(), DiagnosticsError> {
        // A real solver would derive velocities and pressure here; the
        // quickstart just sanity-checks the column totals it was handed.
        for cell in 0..mesh.owned_cells() {
            if !state.thickness[cell].is_finite() {
                return Err(DiagnosticsError::SolveFailed {
                    reason: format!("non-finite thickness at cell {cell}"),
                });
            }
        }
        Ok(())
    }
}

fn main() {
    // 1. One partition, sixteen columns of 100 m ice, no neighbors.
    let mesh = Mesh::uniform(CELLS, 0, LEVELS).expect("mesh is valid");
    let mut partition = Partition::new(PartitionId(0), mesh, HaloMap::isolated());
    {
        let fractions = partition.mesh.layer_fractions().to_vec();
        let old = partition.state.level_mut(TimeLevel::Old);
        for cell in 0..CELLS {
            for (k, f) in fractions.iter().enumerate() {
                old.layer_thickness[cell * LEVELS + k] = 100.0 * f;
            }
            old.thickness[cell] = 100.0;
        }
    }
    let mut domain = Domain::new(vec![partition], Box::new(LocalComm::new()));

    // 2. The driver, with verbose stability diagnostics.
    let mut driver = ForwardEulerStep::new(
        Box::new(MassBalance),
        Box::new(SurfaceElevation),
        StepConfig::new(DT).with_verbose_diagnostics(),
    )
    .expect("config is valid");

    // 3. Step for a simulated day.
    for _ in 0..24 {
        let outcome = driver.step_default(&mut domain);
        if !outcome.is_ok() {
            eprintln!("{outcome}");
            break;
        }
        if let Some(report) = outcome.metrics.stability_report() {
            println!("step {}: {report}", outcome.step);
        }
        domain.advance_time_levels();
    }

    let state = domain.partitions()[0].state.level(TimeLevel::Old);
    println!(
        "after one day: first column {:.6} m, last column {:.6} m",
        state.thickness[0],
        state.thickness[CELLS - 1]
    );
}
