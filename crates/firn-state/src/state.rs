//! The [`PrognosticState`] double buffer and its [`StateLevel`] views.
//!
//! Layer thickness is stored cell-major: `layer_thickness[cell * max_levels + k]`
//! is layer `k` of cell `cell`. Inactive layers (at or above a cell's
//! `max_level_cell`) stay zero. The column total `thickness[cell]` is
//! always the sum of the cell's active layers — a structural invariant
//! maintained by the update stage, not a separately evolved field.

use firn_core::TimeLevel;

/// One time level of the prognostic fields.
///
/// Both buffers are sized at construction and never reallocated during a
/// run; the update stage overwrites every active slot of the new level
/// each step.
#[derive(Clone, Debug, PartialEq)]
pub struct StateLevel {
    /// Per-cell, per-layer ice thickness, cell-major.
    pub layer_thickness: Vec<f64>,
    /// Per-cell column-total ice thickness.
    pub thickness: Vec<f64>,
}

impl StateLevel {
    fn zeroed(cell_count: usize, max_levels: usize) -> Self {
        Self {
            layer_thickness: vec![0.0; cell_count * max_levels],
            thickness: vec![0.0; cell_count],
        }
    }

    /// Layer slice of one cell (all `max_levels` slots, including
    /// inactive ones).
    pub fn column(&self, cell: usize, max_levels: usize) -> &[f64] {
        &self.layer_thickness[cell * max_levels..(cell + 1) * max_levels]
    }

    /// Mutable layer slice of one cell.
    pub fn column_mut(&mut self, cell: usize, max_levels: usize) -> &mut [f64] {
        &mut self.layer_thickness[cell * max_levels..(cell + 1) * max_levels]
    }
}

/// Double-buffered prognostic state of one partition.
///
/// Holds two [`StateLevel`] buffers addressed by [`TimeLevel`]. During a
/// step, [`TimeLevel::Old`] is the frozen beginning-of-step snapshot and
/// [`TimeLevel::New`] is written by the prognostic update stage. After a
/// successful step, [`advance`](Self::advance) swaps the roles so the new
/// level becomes the next step's old level.
///
/// # Examples
///
/// ```
/// use firn_core::TimeLevel;
/// use firn_state::PrognosticState;
///
/// let mut state = PrognosticState::new(4, 2);
/// state.level_mut(TimeLevel::New).thickness[0] = 100.0;
/// state.advance();
/// assert_eq!(state.level(TimeLevel::Old).thickness[0], 100.0);
/// ```
#[derive(Clone, Debug)]
pub struct PrognosticState {
    levels: [StateLevel; 2],
    /// Index into `levels` currently playing the `Old` role.
    old_index: usize,
    cell_count: usize,
    max_levels: usize,
}

impl PrognosticState {
    /// Construct a zeroed state for `cell_count` cells with `max_levels`
    /// vertical layers.
    pub fn new(cell_count: usize, max_levels: usize) -> Self {
        Self {
            levels: [
                StateLevel::zeroed(cell_count, max_levels),
                StateLevel::zeroed(cell_count, max_levels),
            ],
            old_index: 0,
            cell_count,
            max_levels,
        }
    }

    /// Number of cells (owned plus ghost).
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Vertical dimension of the layer buffers.
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    fn index_of(&self, level: TimeLevel) -> usize {
        match level {
            TimeLevel::Old => self.old_index,
            TimeLevel::New => 1 - self.old_index,
        }
    }

    /// Read access to a time level.
    pub fn level(&self, level: TimeLevel) -> &StateLevel {
        &self.levels[self.index_of(level)]
    }

    /// Write access to a time level.
    ///
    /// The driver only ever takes a mutable borrow of [`TimeLevel::New`]
    /// during a step; the old level stays frozen by convention (the type
    /// system cannot see across the enum index, so the invariant is
    /// enforced by the stages and checked by the immutability tests).
    pub fn level_mut(&mut self, level: TimeLevel) -> &mut StateLevel {
        let idx = self.index_of(level);
        &mut self.levels[idx]
    }

    /// Split borrow: the frozen old level and the writable new level.
    ///
    /// This is what the update stage uses so it can read the old buffer
    /// while filling the new one without cloning either.
    pub fn split(&mut self) -> (&StateLevel, &mut StateLevel) {
        let old = self.old_index;
        let (a, b) = self.levels.split_at_mut(1);
        if old == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// Swap the time levels after a successful step.
    ///
    /// The new level becomes the next step's old level; the previous old
    /// buffer is reused as the next write target without being cleared
    /// (the update stage overwrites every active slot).
    pub fn advance(&mut self) {
        self.old_index = 1 - self.old_index;
    }
}
