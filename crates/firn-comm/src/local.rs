//! Single-rank communicator.

use firn_core::FieldTag;

use crate::comm::{CommError, Communicator, HaloMessage};

/// Communicator for a single-rank run.
///
/// Collectives degenerate to identities: reductions return the local
/// value and the halo exchange returns nothing (all halo traffic in a
/// single-rank run is between partitions of the same rank, which the
/// exchange driver delivers without touching the communicator). A
/// non-empty `outgoing` set is a decomposition bug and is reported as
/// [`CommError::UnroutablePartition`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalComm;

impl LocalComm {
    /// Construct the single-rank communicator.
    pub fn new() -> Self {
        Self
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> u32 {
        0
    }

    fn size(&self) -> u32 {
        1
    }

    fn exchange_halo(
        &self,
        _field: FieldTag,
        outgoing: Vec<HaloMessage>,
    ) -> Result<Vec<HaloMessage>, CommError> {
        if let Some(msg) = outgoing.first() {
            return Err(CommError::UnroutablePartition { dest: msg.dest });
        }
        Ok(Vec::new())
    }

    fn min_f64(&self, local: f64) -> Result<f64, CommError> {
        Ok(local)
    }

    fn max_i64(&self, local: i64) -> Result<i64, CommError> {
        Ok(local)
    }
}
