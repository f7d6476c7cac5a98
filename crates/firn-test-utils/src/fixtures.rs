//! Domain fixtures for driver tests.

use firn_comm::{Communicator, LocalComm};
use firn_core::{PartitionId, TimeLevel};
use firn_mesh::{Domain, HaloMap, Mesh, Partition};

/// Single rank, single partition, one cell, one layer, no halo.
///
/// The smallest domain the driver accepts; the workhorse for Euler-step
/// and clamping scenarios.
pub fn single_column_domain(thickness: f64) -> Domain {
    let mesh = Mesh::uniform(1, 0, 1).expect("fixture mesh is valid");
    let mut partition = Partition::new(PartitionId(0), mesh, HaloMap::isolated());
    partition.state.level_mut(TimeLevel::Old).layer_thickness[0] = thickness;
    partition.state.level_mut(TimeLevel::Old).thickness[0] = thickness;
    Domain::new(vec![partition], Box::new(LocalComm::new()))
}

fn boundary_partition(id: PartitionId, peer: PartitionId, levels: usize) -> Partition {
    // Two owned cells (index 1 is the boundary cell) plus one ghost
    // copy of the peer's boundary cell at index 2.
    let mesh = Mesh::uniform(2, 1, levels).expect("fixture mesh is valid");
    let mut halo = HaloMap::isolated();
    halo.send_to(peer, vec![1]);
    halo.recv_from(peer, vec![2]);
    Partition::new(id, mesh, halo)
}

/// Single rank, two partitions sharing one boundary cell each way.
///
/// Partition 0's cell 1 is mirrored as partition 1's ghost cell 2 and
/// vice versa.
pub fn coupled_pair_domain() -> Domain {
    let a = boundary_partition(PartitionId(0), PartitionId(1), 1);
    let b = boundary_partition(PartitionId(1), PartitionId(0), 1);
    Domain::new(vec![a, b], Box::new(LocalComm::new()))
}

/// Two single-partition domains for a two-rank run.
///
/// Partition 0 lives on rank 0 and partition 1 on rank 1, coupled the
/// same way as [`coupled_pair_domain`]. The caller supplies the two
/// communicator endpoints (typically `ThreadComm::create(2, ..)`,
/// optionally wrapped in `CountingComm`).
pub fn split_pair_domains(
    comm0: Box<dyn Communicator>,
    comm1: Box<dyn Communicator>,
) -> (Domain, Domain) {
    let a = boundary_partition(PartitionId(0), PartitionId(1), 1);
    let b = boundary_partition(PartitionId(1), PartitionId(0), 1);
    (
        Domain::new(vec![a], comm0),
        Domain::new(vec![b], comm1),
    )
}

/// Set a cell's old-level thickness in both the layer buffer and the
/// column total (single-layer fixtures only).
pub fn set_old_thickness(domain: &mut Domain, partition_index: usize, cell: usize, value: f64) {
    let partition = &mut domain.partitions_mut()[partition_index];
    let max_levels = partition.mesh.max_levels();
    debug_assert_eq!(max_levels, 1, "helper assumes single-layer fixtures");
    let old = partition.state.level_mut(TimeLevel::Old);
    old.layer_thickness[cell * max_levels] = value;
    old.thickness[cell] = value;
}
