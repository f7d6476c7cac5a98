//! The [`TendencyEvaluator`] trait.

use std::error::Error;
use std::fmt;

use firn_mesh::Mesh;
use firn_state::{StateLevel, Tendency};

/// Errors from a tendency evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum TendencyError {
    /// The evaluator's numerical solve failed.
    SolveFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A non-finite rate was produced.
    ///
    /// Screening for NaN/inf is the evaluator's responsibility; the
    /// prognostic update stage applies whatever rates the buffer holds.
    NonFinite {
        /// First offending cell, if known.
        cell: Option<usize>,
    },
}

impl fmt::Display for TendencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolveFailed { reason } => write!(f, "tendency solve failed: {reason}"),
            Self::NonFinite { cell } => {
                write!(f, "non-finite tendency")?;
                if let Some(c) = cell {
                    write!(f, " at cell {c}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for TendencyError {}

/// Computes the thickness tendency and local stability bound for one
/// partition.
///
/// # Contract
///
/// - `evaluate()` MUST be a pure function of `(mesh, state, dt)`: no
///   hidden mutation of the mesh or the frozen state level, and
///   identical inputs produce identical output.
/// - The returned value is the partition's allowable step size (the
///   CFL-type limit); return `f64::INFINITY` when unconstrained.
/// - The tendency buffer arrives reset; the evaluator fills the active
///   layers of every owned cell. Ghost-cell rates are overwritten by the
///   halo exchange afterwards, so filling them is permitted but
///   pointless.
/// - MUST NOT communicate: the driver calls evaluators inside a purely
///   local loop, and a collective here would desynchronize the ranks.
///
/// # Examples
///
/// A constant thinning rate with no stability constraint:
///
/// ```
/// use firn_mesh::Mesh;
/// use firn_state::{StateLevel, Tendency};
/// use firn_tendency::{TendencyError, TendencyEvaluator};
///
/// struct UniformThinning(f64);
///
/// impl TendencyEvaluator for UniformThinning {
///     fn name(&self) -> &str { "uniform_thinning" }
///
///     fn evaluate(
///         &self,
///         mesh: &Mesh,
///         _state: &StateLevel,
///         _dt: f64,
///         tendency: &mut Tendency,
///     ) -> Result<f64, TendencyError> {
///         for cell in 0..mesh.owned_cells() {
///             for rate in &mut tendency.column_mut(cell)[..mesh.active_levels(cell)] {
///                 *rate = self.0;
///             }
///         }
///         Ok(f64::INFINITY)
///     }
/// }
///
/// let mesh = Mesh::uniform(2, 0, 1).unwrap();
/// let mut tendency = Tendency::new(2, 1);
/// let state = firn_state::PrognosticState::new(2, 1);
/// let eval = UniformThinning(-2.0);
/// let bound = eval
///     .evaluate(&mesh, state.level(firn_core::TimeLevel::Old), 1.0, &mut tendency)
///     .unwrap();
/// assert!(bound.is_infinite());
/// assert_eq!(tendency.column(0), &[-2.0]);
/// ```
pub trait TendencyEvaluator: Send {
    /// Human-readable name for failure reports.
    fn name(&self) -> &str;

    /// Fill `tendency` from the frozen `state` level and return the
    /// partition's allowable step size.
    fn evaluate(
        &self,
        mesh: &Mesh,
        state: &StateLevel,
        dt: f64,
        tendency: &mut Tendency,
    ) -> Result<f64, TendencyError>;
}
