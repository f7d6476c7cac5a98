//! Halo exchange driver: gather, route, apply.
//!
//! Boundary values flow from owning partitions to the ghost copies their
//! neighbors hold. Traffic between two partitions of the same rank is
//! copied directly; everything else rides the communicator. The
//! communicator call is unconditional — it executes exactly once per
//! invocation even when this rank has nothing to send, because the peer
//! ranks are blocked in the same collective.

use std::error::Error;
use std::fmt;

use firn_comm::{CommError, HaloMessage};
use firn_core::{FieldTag, PartitionId};
use firn_mesh::{Domain, Partition};

/// Errors from the halo exchange driver.
#[derive(Clone, Debug, PartialEq)]
pub enum ExchangeError {
    /// The communicator collective failed.
    Comm(CommError),
    /// An inbound message has no matching recv patch.
    ///
    /// The decomposition built asymmetric halo maps; this is a setup
    /// bug, not a runtime condition.
    MissingRecvPatch {
        /// Owning partition that sent the message.
        source: PartitionId,
        /// Destination partition lacking the patch.
        dest: PartitionId,
    },
    /// An inbound message's length disagrees with the recv patch.
    ShapeMismatch {
        /// Owning partition that sent the message.
        source: PartitionId,
        /// Destination partition.
        dest: PartitionId,
        /// Values received.
        received: usize,
        /// Values the patch expects.
        expected: usize,
    },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comm(e) => write!(f, "{e}"),
            Self::MissingRecvPatch { source, dest } => {
                write!(f, "partition {dest} has no recv patch for partition {source}")
            }
            Self::ShapeMismatch {
                source,
                dest,
                received,
                expected,
            } => write!(
                f,
                "halo from partition {source} to {dest}: {received} values for a {expected}-slot patch"
            ),
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Comm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for ExchangeError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

/// Values per cell carried by a field tag.
fn slots_per_cell(partition: &Partition, field: FieldTag) -> usize {
    match field {
        FieldTag::LayerThicknessTendency | FieldTag::LayerThickness => {
            partition.mesh.max_levels()
        }
        FieldTag::Thickness => 1,
    }
}

fn gather_cell(partition: &Partition, field: FieldTag, cell: usize, out: &mut Vec<f64>) {
    match field {
        FieldTag::LayerThicknessTendency => {
            out.extend_from_slice(partition.tendency.column(cell));
        }
        FieldTag::LayerThickness => {
            let level = partition.state.level(firn_core::TimeLevel::New);
            out.extend_from_slice(level.column(cell, partition.mesh.max_levels()));
        }
        FieldTag::Thickness => {
            out.push(
                partition.state.level(firn_core::TimeLevel::New).thickness[cell],
            );
        }
    }
}

fn apply_cell(partition: &mut Partition, field: FieldTag, cell: usize, values: &[f64]) {
    match field {
        FieldTag::LayerThicknessTendency => {
            partition.tendency.column_mut(cell).copy_from_slice(values);
        }
        FieldTag::LayerThickness => {
            let max_levels = partition.mesh.max_levels();
            partition
                .state
                .level_mut(firn_core::TimeLevel::New)
                .column_mut(cell, max_levels)
                .copy_from_slice(values);
        }
        FieldTag::Thickness => {
            partition
                .state
                .level_mut(firn_core::TimeLevel::New)
                .thickness[cell] = values[0];
        }
    }
}

/// Synchronize ghost copies of `field` across all partition boundaries.
///
/// Collective: every rank of the run must call this with the same field,
/// in the same position of its step sequence. Intra-rank messages never
/// touch the communicator; the remote set (possibly empty) is exchanged
/// in exactly one collective call.
pub fn exchange_halo(domain: &mut Domain, field: FieldTag) -> Result<(), ExchangeError> {
    // Gather send patches into messages.
    let mut local = Vec::new();
    let mut remote = Vec::new();
    for partition in domain.partitions() {
        for patch in &partition.halo.sends {
            let mut values =
                Vec::with_capacity(patch.cells.len() * slots_per_cell(partition, field));
            for &cell in &patch.cells {
                gather_cell(partition, field, cell, &mut values);
            }
            let msg = HaloMessage {
                source: partition.id,
                dest: patch.peer,
                values,
            };
            if domain.owns(patch.peer) {
                local.push(msg);
            } else {
                remote.push(msg);
            }
        }
    }

    // The collective runs whether or not there is remote traffic.
    let inbound = domain.comm().exchange_halo(field, remote)?;

    // Apply local copies and inbound messages to ghost cells.
    for msg in local.into_iter().chain(inbound) {
        let Some(partition) = domain.partition_mut(msg.dest) else {
            return Err(ExchangeError::MissingRecvPatch {
                source: msg.source,
                dest: msg.dest,
            });
        };
        let slots = slots_per_cell(partition, field);
        let Some(patch) = partition.halo.recv_patch(msg.source).cloned() else {
            return Err(ExchangeError::MissingRecvPatch {
                source: msg.source,
                dest: msg.dest,
            });
        };
        let expected = patch.cells.len() * slots;
        if msg.values.len() != expected {
            return Err(ExchangeError::ShapeMismatch {
                source: msg.source,
                dest: msg.dest,
                received: msg.values.len(),
                expected,
            });
        }
        for (i, &cell) in patch.cells.iter().enumerate() {
            apply_cell(partition, field, cell, &msg.values[i * slots..(i + 1) * slots]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use firn_comm::LocalComm;
    use firn_mesh::{HaloMap, Mesh};

    /// Two partitions on one rank: each owns 2 cells and holds one ghost
    /// copy of the peer's boundary cell (cell index 2).
    fn coupled_pair() -> Domain {
        let mut halo_a = HaloMap::isolated();
        halo_a.send_to(PartitionId(1), vec![1]);
        halo_a.recv_from(PartitionId(1), vec![2]);
        let mut halo_b = HaloMap::isolated();
        halo_b.send_to(PartitionId(0), vec![0]);
        halo_b.recv_from(PartitionId(0), vec![2]);

        let a = Partition::new(PartitionId(0), Mesh::uniform(2, 1, 2).unwrap(), halo_a);
        let b = Partition::new(PartitionId(1), Mesh::uniform(2, 1, 2).unwrap(), halo_b);
        Domain::new(vec![a, b], Box::new(LocalComm::new()))
    }

    #[test]
    fn intra_rank_tendency_exchange_fills_ghosts() {
        let mut domain = coupled_pair();
        domain.partitions_mut()[0]
            .tendency
            .column_mut(1)
            .copy_from_slice(&[3.0, 3.5]);
        domain.partitions_mut()[1]
            .tendency
            .column_mut(0)
            .copy_from_slice(&[5.0, 5.5]);

        exchange_halo(&mut domain, FieldTag::LayerThicknessTendency).unwrap();

        assert_eq!(domain.partitions()[1].tendency.column(2), &[3.0, 3.5]);
        assert_eq!(domain.partitions()[0].tendency.column(2), &[5.0, 5.5]);
    }

    #[test]
    fn thickness_exchange_moves_one_slot_per_cell() {
        let mut domain = coupled_pair();
        domain.partitions_mut()[0]
            .state
            .level_mut(firn_core::TimeLevel::New)
            .thickness[1] = 42.0;

        exchange_halo(&mut domain, FieldTag::Thickness).unwrap();

        assert_eq!(
            domain.partitions()[1]
                .state
                .level(firn_core::TimeLevel::New)
                .thickness[2],
            42.0
        );
    }

    #[test]
    fn asymmetric_halo_maps_are_reported() {
        let mut domain = coupled_pair();
        domain.partitions_mut()[1].halo.recvs.clear();
        let err = exchange_halo(&mut domain, FieldTag::LayerThicknessTendency).unwrap_err();
        assert_eq!(
            err,
            ExchangeError::MissingRecvPatch {
                source: PartitionId(0),
                dest: PartitionId(1),
            }
        );
    }
}
