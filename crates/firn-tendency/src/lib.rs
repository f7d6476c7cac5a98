//! Collaborator contracts for the Firn time-integration driver.
//!
//! The driver treats the numerical physics as external collaborators
//! behind two object-safe traits: [`TendencyEvaluator`] produces the
//! rate-of-change field and the local stability bound for one partition,
//! and [`DiagnosticsSolver`] re-derives dependent quantities (velocity,
//! pressure, and friends) for a freshly advanced state. Both are pure
//! with respect to the mesh and the frozen time level they read.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod evaluator;

pub use diagnostics::{DiagnosticsError, DiagnosticsSolver};
pub use evaluator::{TendencyError, TendencyEvaluator};
