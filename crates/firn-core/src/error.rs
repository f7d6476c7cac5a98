//! Step error taxonomy and the [`StepErrors`] accumulation set.
//!
//! A time step never aborts mid-flight: every partition is visited and
//! every collective call executes regardless of local failures, so errors
//! are accumulated, not propagated eagerly. [`StepErrors`] is the
//! accumulator — a small set of fired [`StepErrorKind`]s combined by set
//! union, so a failure in one partition or stage can never be masked by
//! success elsewhere.

use std::error::Error;
use std::fmt;

/// One kind of failure that can fire during a time step.
///
/// Kinds are coarse by design: the per-stage accumulators record *which
/// stage* failed, while the human-readable detail is carried in the step
/// metrics and stage reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepErrorKind {
    /// The tendency evaluator failed on at least one partition.
    Tendency,
    /// The halo exchange collective failed.
    HaloExchange,
    /// A global reduction collective failed.
    Reduction,
    /// Diagnostic recomputation failed on at least one partition.
    Diagnostics,
}

impl StepErrorKind {
    const ALL: [StepErrorKind; 4] = [
        Self::Tendency,
        Self::HaloExchange,
        Self::Reduction,
        Self::Diagnostics,
    ];

    fn bit(self) -> u32 {
        match self {
            Self::Tendency => 1 << 0,
            Self::HaloExchange => 1 << 1,
            Self::Reduction => 1 << 2,
            Self::Diagnostics => 1 << 3,
        }
    }
}

impl fmt::Display for StepErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tendency => write!(f, "tendency evaluation failed"),
            Self::HaloExchange => write!(f, "halo exchange failed"),
            Self::Reduction => write!(f, "global reduction failed"),
            Self::Diagnostics => write!(f, "diagnostic recomputation failed"),
        }
    }
}

impl Error for StepErrorKind {}

/// Set of [`StepErrorKind`]s fired during a stage or a whole step.
///
/// Backed by a `u32` bitset. Merging is set union: once a kind has fired
/// it stays fired, whatever later partitions or stages report. An empty
/// set means the step succeeded.
///
/// # Examples
///
/// ```
/// use firn_core::{StepErrorKind, StepErrors};
///
/// let mut errors = StepErrors::none();
/// assert!(errors.is_empty());
///
/// errors.insert(StepErrorKind::Tendency);
/// errors.merge(StepErrors::from(StepErrorKind::Diagnostics));
/// assert!(errors.contains(StepErrorKind::Tendency));
/// assert!(errors.contains(StepErrorKind::Diagnostics));
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StepErrors {
    bits: u32,
}

impl StepErrors {
    /// The empty set: no failures fired.
    pub fn none() -> Self {
        Self { bits: 0 }
    }

    /// Insert a fired kind into the set.
    pub fn insert(&mut self, kind: StepErrorKind) {
        self.bits |= kind.bit();
    }

    /// Merge another accumulator into this one (set union, in place).
    pub fn merge(&mut self, other: StepErrors) {
        self.bits |= other.bits;
    }

    /// Return the union of two accumulators.
    pub fn union(self, other: StepErrors) -> StepErrors {
        StepErrors {
            bits: self.bits | other.bits,
        }
    }

    /// Check whether a kind has fired.
    pub fn contains(self, kind: StepErrorKind) -> bool {
        self.bits & kind.bit() != 0
    }

    /// Returns `true` if no failure has fired.
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Number of distinct kinds fired.
    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate over the fired kinds in declaration order.
    pub fn iter(self) -> impl Iterator<Item = StepErrorKind> {
        StepErrorKind::ALL
            .into_iter()
            .filter(move |k| self.contains(*k))
    }

    /// Convert to a `Result`: `Ok(())` when empty, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), StepErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<StepErrorKind> for StepErrors {
    fn from(kind: StepErrorKind) -> Self {
        let mut set = Self::none();
        set.insert(kind);
        set
    }
}

impl FromIterator<StepErrorKind> for StepErrors {
    fn from_iter<I: IntoIterator<Item = StepErrorKind>>(iter: I) -> Self {
        let mut set = Self::none();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Display for StepErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no errors");
        }
        let mut first = true;
        for kind in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{kind}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for StepErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_kind() -> impl Strategy<Value = StepErrorKind> {
        prop_oneof![
            Just(StepErrorKind::Tendency),
            Just(StepErrorKind::HaloExchange),
            Just(StepErrorKind::Reduction),
            Just(StepErrorKind::Diagnostics),
        ]
    }

    fn arb_errors() -> impl Strategy<Value = StepErrors> {
        prop::collection::vec(arb_kind(), 0..8)
            .prop_map(|kinds| kinds.into_iter().collect::<StepErrors>())
    }

    proptest! {
        #[test]
        fn union_commutative(a in arb_errors(), b in arb_errors()) {
            prop_assert_eq!(a.union(b), b.union(a));
        }

        #[test]
        fn union_associative(a in arb_errors(), b in arb_errors(), c in arb_errors()) {
            prop_assert_eq!(a.union(b).union(c), a.union(b.union(c)));
        }

        #[test]
        fn union_idempotent(a in arb_errors()) {
            prop_assert_eq!(a.union(a), a);
        }

        #[test]
        fn union_identity(a in arb_errors()) {
            prop_assert_eq!(a.union(StepErrors::none()), a);
        }

        #[test]
        fn merge_never_masks(a in arb_errors(), b in arb_errors()) {
            let mut merged = a;
            merged.merge(b);
            for kind in a.iter().chain(b.iter()) {
                prop_assert!(merged.contains(kind), "kind {kind:?} masked by merge");
            }
        }

        #[test]
        fn insert_order_irrelevant(kinds in prop::collection::vec(arb_kind(), 0..8)) {
            let forward: StepErrors = kinds.iter().copied().collect();
            let backward: StepErrors = kinds.iter().rev().copied().collect();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn len_matches_iter_count(a in arb_errors()) {
            prop_assert_eq!(a.len(), a.iter().count());
        }
    }

    #[test]
    fn into_result_empty_is_ok() {
        assert!(StepErrors::none().into_result().is_ok());
    }

    #[test]
    fn into_result_nonempty_is_err() {
        let errors = StepErrors::from(StepErrorKind::Tendency);
        assert_eq!(errors.into_result(), Err(errors));
    }

    #[test]
    fn display_lists_fired_kinds() {
        let mut errors = StepErrors::none();
        errors.insert(StepErrorKind::Tendency);
        errors.insert(StepErrorKind::Diagnostics);
        let text = errors.to_string();
        assert!(text.contains("tendency evaluation failed"));
        assert!(text.contains("diagnostic recomputation failed"));
    }
}
