//! Halo send/recv patches describing a partition's boundary coupling.

use smallvec::SmallVec;

use firn_core::PartitionId;

/// One directed boundary patch between a pair of partitions.
///
/// On the sending side, `cells` are local indices of owned boundary
/// cells whose values the peer needs; on the receiving side, `cells` are
/// local indices of the ghost copies. A send patch and its matching recv
/// patch are built together by the domain decomposition and list the
/// same boundary cells in the same order, so values are matched by
/// position.
#[derive(Clone, Debug, PartialEq)]
pub struct HaloPatch {
    /// The partition on the other end of this patch.
    pub peer: PartitionId,
    /// Local cell indices, in patch order.
    pub cells: Vec<usize>,
}

/// All halo patches of one partition.
///
/// Partitions typically touch only a handful of neighbors, so the patch
/// lists are `SmallVec`-backed.
#[derive(Clone, Debug, Default)]
pub struct HaloMap {
    /// Owned boundary cells exported to each neighbor.
    pub sends: SmallVec<[HaloPatch; 4]>,
    /// Ghost cells imported from each neighbor.
    pub recvs: SmallVec<[HaloPatch; 4]>,
}

impl HaloMap {
    /// A partition with no neighbors (single-partition runs).
    pub fn isolated() -> Self {
        Self::default()
    }

    /// Add a send patch: `cells` (owned, local indices) go to `peer`.
    pub fn send_to(&mut self, peer: PartitionId, cells: Vec<usize>) {
        self.sends.push(HaloPatch { peer, cells });
    }

    /// Add a recv patch: ghost `cells` (local indices) come from `peer`.
    pub fn recv_from(&mut self, peer: PartitionId, cells: Vec<usize>) {
        self.recvs.push(HaloPatch { peer, cells });
    }

    /// The recv patch for a given source partition, if any.
    pub fn recv_patch(&self, peer: PartitionId) -> Option<&HaloPatch> {
        self.recvs.iter().find(|p| p.peer == peer)
    }
}
