//! The [`Communicator`] trait and halo message types.

use std::error::Error;
use std::fmt;

use firn_core::{FieldTag, PartitionId};

/// One halo payload: boundary-cell values flowing from an owning
/// partition to a neighbor that holds those cells as ghosts.
///
/// Values are ordered by the send patch on the source side and matched
/// positionally against the recv patch on the destination side; the two
/// patches are built together by the domain decomposition and must have
/// equal lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct HaloMessage {
    /// Partition that owns the cells.
    pub source: PartitionId,
    /// Partition holding the ghost copies.
    pub dest: PartitionId,
    /// Field values in send-patch order.
    pub values: Vec<f64>,
}

/// Errors from collective communication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A peer issued a different collective than this rank.
    ///
    /// Raised by [`ThreadComm`](crate::ThreadComm) when an inbound
    /// envelope carries the wrong payload kind — the simulated
    /// equivalent of an MPI tag mismatch, which in a real run would
    /// deadlock rather than fail.
    ProtocolMismatch {
        /// What this rank was executing.
        expected: &'static str,
        /// What the peer sent.
        received: &'static str,
    },
    /// A peer did not respond within the collective timeout.
    Timeout {
        /// Rank that failed to deliver.
        peer: u32,
    },
    /// A peer disconnected (its communicator was dropped mid-run).
    Disconnected {
        /// Rank whose channel closed.
        peer: u32,
    },
    /// A halo message was addressed to a partition no rank owns.
    UnroutablePartition {
        /// The unknown destination.
        dest: PartitionId,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtocolMismatch { expected, received } => {
                write!(
                    f,
                    "collective mismatch: this rank in {expected}, peer sent {received}"
                )
            }
            Self::Timeout { peer } => write!(f, "timed out waiting for rank {peer}"),
            Self::Disconnected { peer } => write!(f, "rank {peer} disconnected"),
            Self::UnroutablePartition { dest } => {
                write!(f, "no rank owns destination partition {dest}")
            }
        }
    }
}

impl Error for CommError {}

/// Collective communication across the ranks of a run.
///
/// # Contract
///
/// - Every method is collective: all ranks must call it, in the same
///   order, with the same `field` tag where one applies. Skipping a call
///   on one rank — for any reason, including a local error — stalls all
///   ranks in a real distributed run.
/// - [`exchange_halo`](Self::exchange_halo) must be called even when
///   `outgoing` is empty; "nothing to send" is not "nothing to do".
/// - Implementations are `Send` so a rank's communicator can live on the
///   rank's own thread in test harnesses.
pub trait Communicator: Send {
    /// This rank's index, in `0..size()`.
    fn rank(&self) -> u32;

    /// Number of ranks participating in the run.
    fn size(&self) -> u32;

    /// Exchange halo payloads with peer ranks.
    ///
    /// `outgoing` holds the messages destined for partitions owned by
    /// *other* ranks (intra-rank traffic never reaches the
    /// communicator). Returns the messages other ranks sent to
    /// partitions owned by this rank.
    fn exchange_halo(
        &self,
        field: FieldTag,
        outgoing: Vec<HaloMessage>,
    ) -> Result<Vec<HaloMessage>, CommError>;

    /// Global minimum of a per-rank real value.
    fn min_f64(&self, local: f64) -> Result<f64, CommError>;

    /// Global maximum of a per-rank integer value.
    fn max_i64(&self, local: i64) -> Result<i64, CommError>;
}
