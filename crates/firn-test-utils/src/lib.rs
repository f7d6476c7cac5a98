//! Test fixtures and mock collaborators for Firn development.
//!
//! Provides mock implementations of the collaborator traits
//! ([`TendencyEvaluator`], [`DiagnosticsSolver`]), a call-logging
//! [`CountingComm`] wrapper for collective-symmetry assertions, and
//! domain fixtures used across the engine's integration tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::{
    coupled_pair_domain, set_old_thickness, single_column_domain, split_pair_domains,
};
pub use mocks::{
    CollectiveCall, CountingComm, EchoThickness, FailingEvaluator, NoopDiagnostics,
    RecordingDiagnostics, UniformThinning,
};
