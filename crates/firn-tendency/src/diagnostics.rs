//! The [`DiagnosticsSolver`] trait.

use std::error::Error;
use std::fmt;

use firn_mesh::Mesh;
use firn_state::StateLevel;

/// Errors from diagnostic recomputation.
#[derive(Clone, Debug, PartialEq)]
pub enum DiagnosticsError {
    /// The diagnostic solve (velocity, pressure, ...) failed.
    SolveFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The solver did not converge within its iteration budget.
    NotConverged {
        /// Iterations attempted.
        iterations: u32,
    },
}

impl fmt::Display for DiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolveFailed { reason } => write!(f, "diagnostic solve failed: {reason}"),
            Self::NotConverged { iterations } => {
                write!(f, "diagnostic solve did not converge after {iterations} iterations")
            }
        }
    }
}

impl Error for DiagnosticsError {}

/// Re-derives dependent diagnostic quantities for a freshly advanced
/// prognostic state.
///
/// Invoked once per partition per step, on the new time level, after the
/// prognostic update stage. Which quantities are derived (velocities,
/// pressure, surface elevation) is entirely the collaborator's business;
/// the driver only sequences the call and accumulates its errors. Where
/// the pressure computation references the bottom depth versus the
/// sea-surface-adjusted depth is likewise the collaborator's decision.
pub trait DiagnosticsSolver: Send {
    /// Human-readable name for failure reports.
    fn name(&self) -> &str;

    /// Recompute diagnostics for one partition's new time level.
    fn recompute(&self, mesh: &Mesh, state: &mut StateLevel) -> Result<(), DiagnosticsError>;
}
