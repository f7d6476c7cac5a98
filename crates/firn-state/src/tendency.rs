//! The per-partition [`Tendency`] buffer.

/// Rate-of-change field for one partition, aligned with the mesh's
/// per-cell, per-layer structure (cell-major, like the state buffers).
///
/// Rebuilt from scratch by the tendency evaluator every step and made
/// boundary-consistent by the halo exchange before the prognostic update
/// reads it. Never persisted across steps.
#[derive(Clone, Debug)]
pub struct Tendency {
    /// Per-cell, per-layer thickness tendency, cell-major.
    pub layer_thickness: Vec<f64>,
    /// Maximum step size consistent with numerical stability for this
    /// partition's current state. `f64::INFINITY` when unconstrained
    /// (including when the evaluator failed — the failure itself travels
    /// through the error accumulator, not through the bound).
    pub allowable_dt: f64,
    max_levels: usize,
}

impl Tendency {
    /// Construct a zeroed tendency buffer.
    pub fn new(cell_count: usize, max_levels: usize) -> Self {
        Self {
            layer_thickness: vec![0.0; cell_count * max_levels],
            allowable_dt: f64::INFINITY,
            max_levels,
        }
    }

    /// Vertical dimension of the buffer.
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Layer slice of one cell.
    pub fn column(&self, cell: usize) -> &[f64] {
        &self.layer_thickness[cell * self.max_levels..(cell + 1) * self.max_levels]
    }

    /// Mutable layer slice of one cell.
    pub fn column_mut(&mut self, cell: usize) -> &mut [f64] {
        &mut self.layer_thickness[cell * self.max_levels..(cell + 1) * self.max_levels]
    }

    /// Reset for the next step: zero the rates and lift the bound.
    pub fn reset(&mut self) {
        self.layer_thickness.fill(0.0);
        self.allowable_dt = f64::INFINITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_unconstrained() {
        let tend = Tendency::new(2, 3);
        assert_eq!(tend.layer_thickness.len(), 6);
        assert_eq!(tend.allowable_dt, f64::INFINITY);
    }

    #[test]
    fn reset_clears_rates_and_bound() {
        let mut tend = Tendency::new(1, 2);
        tend.layer_thickness[0] = -4.0;
        tend.allowable_dt = 12.5;
        tend.reset();
        assert_eq!(tend.layer_thickness, vec![0.0, 0.0]);
        assert_eq!(tend.allowable_dt, f64::INFINITY);
    }

    #[test]
    fn column_is_cell_major() {
        let mut tend = Tendency::new(2, 2);
        tend.column_mut(1)[0] = 3.0;
        assert_eq!(tend.layer_thickness[2], 3.0);
    }
}
