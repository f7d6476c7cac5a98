//! Explicit time-integration driver for the Firn ice-sheet model.
//!
//! [`ForwardEulerStep`] advances every partition of a [`Domain`](firn_mesh::Domain)
//! by one explicit Euler step: tendency stage (local evaluation, then one
//! halo exchange, then the optional stability reductions), prognostic
//! update stage (Euler update, column totals, non-negativity clamp), and
//! finally the external diagnostic recomputation on the new time level.
//!
//! # Error semantics
//!
//! Failures accumulate, they never abort: every partition is always
//! visited and every collective call always executes, whatever the local
//! error state — skipping a collective on one rank would deadlock all
//! ranks. The merged [`StepErrors`](firn_core::StepErrors) set is
//! returned to the caller, who owns the abort/continue policy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod exchange;
pub mod metrics;
pub mod step;
pub mod tendency_stage;
pub mod update_stage;

pub use exchange::{exchange_halo, ExchangeError};
pub use metrics::{StabilityReport, StepMetrics};
pub use step::{ForwardEulerStep, StepOutcome};
pub use tendency_stage::compute_tendencies;
pub use update_stage::advance_prognostics;
