//! Firn: an explicit time-stepping driver for ice-sheet thickness
//! evolution on domain-decomposed meshes.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Firn sub-crates. For most users, adding `firn` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use firn::prelude::*;
//!
//! // A thickness tendency that thins every column at a constant rate.
//! struct ConstantThinning;
//!
//! impl TendencyEvaluator for ConstantThinning {
//!     fn name(&self) -> &str { "constant_thinning" }
//!
//!     fn evaluate(
//!         &self,
//!         mesh: &Mesh,
//!         _state: &StateLevel,
//!         _dt: f64,
//!         tendency: &mut Tendency,
//!     ) -> Result<f64, TendencyError> {
//!         for cell in 0..mesh.owned_cells() {
//!             tendency.column_mut(cell)[..mesh.active_levels(cell)].fill(-2.0);
//!         }
//!         Ok(f64::INFINITY)
//!     }
//! }
//!
//! // Diagnostics are external; a run without them uses a no-op solver.
//! struct NoDiagnostics;
//!
//! impl DiagnosticsSolver for NoDiagnostics {
//!     fn name(&self) -> &str { "none" }
//!     fn recompute(&self, _mesh: &Mesh, _state: &mut StateLevel)
//!         -> Result<(), DiagnosticsError> { Ok(()) }
//! }
//!
//! // Single rank, one partition, one 10 m column.
//! let mesh = Mesh::uniform(1, 0, 1).unwrap();
//! let mut partition = Partition::new(PartitionId(0), mesh, HaloMap::isolated());
//! partition.state.level_mut(TimeLevel::Old).layer_thickness[0] = 10.0;
//! partition.state.level_mut(TimeLevel::Old).thickness[0] = 10.0;
//! let mut domain = Domain::new(vec![partition], Box::new(LocalComm::new()));
//!
//! let mut driver = ForwardEulerStep::new(
//!     Box::new(ConstantThinning),
//!     Box::new(NoDiagnostics),
//!     StepConfig::new(1.0),
//! ).unwrap();
//!
//! let outcome = driver.step(&mut domain, 1.0);
//! assert!(outcome.is_ok());
//! assert_eq!(domain.partitions()[0].state.level(TimeLevel::New).thickness[0], 8.0);
//! domain.advance_time_levels();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core IDs, error set, and configuration.
pub mod types {
    pub use firn_core::{
        ConfigError, FieldTag, PartitionId, RankId, StepConfig, StepErrorKind, StepErrors,
        StepId, TimeLevel,
    };
}

/// Prognostic state buffers.
pub mod state {
    pub use firn_state::{PrognosticState, StateLevel, Tendency};
}

/// Collective communication.
pub mod comm {
    pub use firn_comm::{CommError, Communicator, HaloMessage, LocalComm, ThreadComm};
}

/// Mesh, partitions, and domains.
pub mod mesh {
    pub use firn_mesh::{Domain, HaloMap, HaloPatch, Mesh, MeshError, Partition};
}

/// Collaborator contracts.
pub mod tendency {
    pub use firn_tendency::{
        DiagnosticsError, DiagnosticsSolver, TendencyError, TendencyEvaluator,
    };
}

/// The time-integration driver.
pub mod engine {
    pub use firn_engine::{
        advance_prognostics, compute_tendencies, exchange_halo, ExchangeError,
        ForwardEulerStep, StabilityReport, StepMetrics, StepOutcome,
    };
}

/// Convenience re-exports covering the common driver surface.
pub mod prelude {
    pub use firn_comm::{Communicator, LocalComm};
    pub use firn_core::{PartitionId, StepConfig, StepErrorKind, StepErrors, TimeLevel};
    pub use firn_engine::{ForwardEulerStep, StepMetrics, StepOutcome};
    pub use firn_mesh::{Domain, HaloMap, Mesh, Partition};
    pub use firn_state::{PrognosticState, StateLevel, Tendency};
    pub use firn_tendency::{
        DiagnosticsError, DiagnosticsSolver, TendencyError, TendencyEvaluator,
    };
}
