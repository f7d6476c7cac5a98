//! The per-partition [`Mesh`]: vertical layer structure and cell layout.

use std::error::Error;
use std::fmt;

/// Vertical and horizontal structure of one mesh partition.
///
/// Cells are laid out owned-first: indices `0..owned_cells` are owned by
/// this partition, indices `owned_cells..cell_count` are ghost copies of
/// neighbors' boundary cells, refreshed by the halo exchange. The mesh
/// is read-only for the lifetime of a step.
#[derive(Clone, Debug)]
pub struct Mesh {
    cell_count: usize,
    owned_cells: usize,
    max_levels: usize,
    /// Number of active vertical layers per cell; layers at or above
    /// this index carry no ice and stay zero.
    max_level_cell: Vec<usize>,
    /// Fraction of the column total assigned to each vertical layer.
    /// Sums to 1 over the full vertical dimension.
    layer_fractions: Vec<f64>,
}

impl Mesh {
    /// Construct and validate a mesh.
    ///
    /// `max_level_cell` must have one entry per cell, each at most
    /// `layer_fractions.len()`; the layer fractions must be non-negative
    /// and sum to 1 within rounding.
    pub fn new(
        owned_cells: usize,
        ghost_cells: usize,
        max_level_cell: Vec<usize>,
        layer_fractions: Vec<f64>,
    ) -> Result<Self, MeshError> {
        let cell_count = owned_cells + ghost_cells;
        let max_levels = layer_fractions.len();
        if max_levels == 0 {
            return Err(MeshError::NoLayers);
        }
        if max_level_cell.len() != cell_count {
            return Err(MeshError::LevelCountMismatch {
                cells: cell_count,
                entries: max_level_cell.len(),
            });
        }
        if let Some((cell, &levels)) = max_level_cell
            .iter()
            .enumerate()
            .find(|(_, &levels)| levels > max_levels)
        {
            return Err(MeshError::LevelOutOfRange {
                cell,
                levels,
                max_levels,
            });
        }
        let sum: f64 = layer_fractions.iter().sum();
        if layer_fractions.iter().any(|&f| f < 0.0) || (sum - 1.0).abs() > 1e-12 {
            return Err(MeshError::BadLayerFractions { sum });
        }
        Ok(Self {
            cell_count,
            owned_cells,
            max_levels,
            max_level_cell,
            layer_fractions,
        })
    }

    /// A uniform mesh: every cell active through all layers, equal
    /// layer fractions. The common fixture shape.
    pub fn uniform(owned_cells: usize, ghost_cells: usize, levels: usize) -> Result<Self, MeshError> {
        let cell_count = owned_cells + ghost_cells;
        Self::new(
            owned_cells,
            ghost_cells,
            vec![levels; cell_count],
            vec![1.0 / levels as f64; levels],
        )
    }

    /// Total cells on this partition, owned plus ghost.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Number of owned cells; these come first in every cell-indexed buffer.
    pub fn owned_cells(&self) -> usize {
        self.owned_cells
    }

    /// Vertical dimension of layer-indexed buffers.
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Number of active layers in a cell.
    pub fn active_levels(&self, cell: usize) -> usize {
        self.max_level_cell[cell]
    }

    /// Per-layer thickness-fraction weights.
    pub fn layer_fractions(&self) -> &[f64] {
        &self.layer_fractions
    }
}

/// Errors from [`Mesh::new`].
#[derive(Clone, Debug, PartialEq)]
pub enum MeshError {
    /// The mesh has no vertical layers.
    NoLayers,
    /// `max_level_cell` does not have one entry per cell.
    LevelCountMismatch {
        /// Total cells declared.
        cells: usize,
        /// Entries provided.
        entries: usize,
    },
    /// A cell claims more active layers than the vertical dimension.
    LevelOutOfRange {
        /// The offending cell.
        cell: usize,
        /// Its declared active layers.
        levels: usize,
        /// The vertical dimension.
        max_levels: usize,
    },
    /// Layer fractions are negative or do not sum to 1.
    BadLayerFractions {
        /// The actual sum.
        sum: f64,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLayers => write!(f, "mesh must have at least one vertical layer"),
            Self::LevelCountMismatch { cells, entries } => {
                write!(f, "max_level_cell has {entries} entries for {cells} cells")
            }
            Self::LevelOutOfRange {
                cell,
                levels,
                max_levels,
            } => write!(
                f,
                "cell {cell} claims {levels} active layers, vertical dimension is {max_levels}"
            ),
            Self::BadLayerFractions { sum } => {
                write!(f, "layer fractions must be non-negative and sum to 1, sum is {sum}")
            }
        }
    }
}

impl Error for MeshError {}
