//! Strongly-typed identifiers shared across the Firn workspace.

use std::fmt;

/// Identifies a mesh partition, unique across all ranks of a run.
///
/// Partition IDs are assigned by the domain decomposition at startup and
/// never change during a run. Halo send/recv patches are keyed by the
/// peer's `PartitionId`, so the same ID must not be reused on two ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(pub u32);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PartitionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a rank (process) in the distributed execution model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankId(pub u32);

impl fmt::Display for RankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RankId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing step counter.
///
/// Incremented each time the driver advances the prognostic state by one
/// explicit step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// One of the two buffered snapshots of prognostic state.
///
/// `Old` is the immutable beginning-of-step snapshot; `New` is the
/// end-of-step target written by the prognostic update stage. After a
/// successful step the buffers swap roles via
/// `PrognosticState::advance()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeLevel {
    /// Beginning-of-step snapshot. Read-only during a step.
    Old,
    /// End-of-step target. Written only by the prognostic update stage.
    New,
}

impl TimeLevel {
    /// The other time level.
    pub fn other(self) -> Self {
        match self {
            Self::Old => Self::New,
            Self::New => Self::Old,
        }
    }
}

impl fmt::Display for TimeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// Names a halo-exchangeable field for the communication layer.
///
/// The halo exchange primitive is collective and field-addressed: every
/// rank must name the same field in the same order. The tag travels in
/// each halo envelope so a mismatched exchange is detected as a protocol
/// error instead of silently mixing fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldTag {
    /// Per-layer rate of change of layer thickness.
    LayerThicknessTendency,
    /// Per-layer prognostic thickness.
    LayerThickness,
    /// Column-total ice thickness.
    Thickness,
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayerThicknessTendency => write!(f, "layerThicknessTendency"),
            Self::LayerThickness => write!(f, "layerThickness"),
            Self::Thickness => write!(f, "thickness"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_level_other_is_involutive() {
        assert_eq!(TimeLevel::Old.other(), TimeLevel::New);
        assert_eq!(TimeLevel::New.other(), TimeLevel::Old);
        assert_eq!(TimeLevel::Old.other().other(), TimeLevel::Old);
    }

    #[test]
    fn display_round_trip_is_stable() {
        assert_eq!(PartitionId(7).to_string(), "7");
        assert_eq!(StepId(42).to_string(), "42");
        assert_eq!(FieldTag::Thickness.to_string(), "thickness");
    }
}
