//! The rank-local [`Domain`] and its [`Partition`]s.

use firn_comm::Communicator;
use firn_core::PartitionId;
use firn_state::{PrognosticState, Tendency};

use crate::halo::HaloMap;
use crate::mesh::Mesh;

/// One mesh subdomain owned by this rank.
///
/// Bundles the read-only [`Mesh`], the double-buffered prognostic state,
/// the per-step tendency buffer, and the halo patches. Partitions are
/// processed independently and sequentially within a rank; no two
/// partitions ever alias the same buffers.
#[derive(Debug)]
pub struct Partition {
    /// Run-unique identifier, assigned by the decomposition.
    pub id: PartitionId,
    /// Vertical/horizontal structure. Read-only during a step.
    pub mesh: Mesh,
    /// Double-buffered prognostic thickness fields.
    pub state: PrognosticState,
    /// Per-step rate-of-change buffer and stability bound.
    pub tendency: Tendency,
    /// Boundary coupling with neighbor partitions.
    pub halo: HaloMap,
}

impl Partition {
    /// Construct a partition with zeroed state sized to `mesh`.
    pub fn new(id: PartitionId, mesh: Mesh, halo: HaloMap) -> Self {
        let state = PrognosticState::new(mesh.cell_count(), mesh.max_levels());
        let tendency = Tendency::new(mesh.cell_count(), mesh.max_levels());
        Self {
            id,
            mesh,
            state,
            tendency,
            halo,
        }
    }
}

/// Rank-wide context: the ordered partitions owned by this rank plus the
/// communicator handle.
///
/// Partition order is fixed at construction and stable across steps, so
/// traversals (and therefore floating-point accumulation order) are
/// reproducible run to run.
pub struct Domain {
    partitions: Vec<Partition>,
    comm: Box<dyn Communicator>,
}

impl Domain {
    /// Assemble a domain from its partitions and communicator.
    pub fn new(partitions: Vec<Partition>, comm: Box<dyn Communicator>) -> Self {
        Self { partitions, comm }
    }

    /// The partitions, in stable traversal order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Mutable access to the partitions, same order.
    pub fn partitions_mut(&mut self) -> &mut [Partition] {
        &mut self.partitions
    }

    /// The communicator handle for this rank.
    pub fn comm(&self) -> &dyn Communicator {
        self.comm.as_ref()
    }

    /// Whether a partition lives on this rank.
    pub fn owns(&self, id: PartitionId) -> bool {
        self.partitions.iter().any(|p| p.id == id)
    }

    /// Look up a local partition by ID.
    pub fn partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.id == id)
    }

    /// Look up a local partition mutably by ID.
    pub fn partition_mut(&mut self, id: PartitionId) -> Option<&mut Partition> {
        self.partitions.iter_mut().find(|p| p.id == id)
    }

    /// Consume the domain, yielding its partitions.
    ///
    /// Lets a caller re-house partitions under a different communicator
    /// (test harnesses wrap communicators in instrumentation).
    pub fn into_partitions(self) -> Vec<Partition> {
        self.partitions
    }

    /// Swap the time levels of every partition after a successful step.
    ///
    /// The end-of-step level becomes the next step's beginning-of-step
    /// snapshot. Callers invoke this between steps; the driver itself
    /// never swaps mid-step.
    pub fn advance_time_levels(&mut self) {
        for partition in &mut self.partitions {
            partition.state.advance();
        }
    }
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("partitions", &self.partitions.len())
            .field("rank", &self.comm.rank())
            .field("size", &self.comm.size())
            .finish()
    }
}
