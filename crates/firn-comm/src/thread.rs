//! Channel-wired multi-rank communicator for simulated runs.
//!
//! [`ThreadComm`] gives each rank of a test harness its own communicator
//! endpoint; ranks live on ordinary threads and exchange envelopes over
//! dedicated per-pair `crossbeam-channel` channels. Per-pair FIFO order
//! plus the requirement that all ranks issue collectives in the same
//! order means an inbound envelope of the wrong kind is always a
//! protocol violation, never legitimate reordering — so it is reported
//! as [`CommError::ProtocolMismatch`] instead of hanging the harness.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use indexmap::IndexMap;

use firn_core::{FieldTag, PartitionId};

use crate::comm::{CommError, Communicator, HaloMessage};

/// Default wait for a peer's contribution to a collective.
const COLLECTIVE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
enum Payload {
    Halo {
        field: FieldTag,
        messages: Vec<HaloMessage>,
    },
    MinF64(f64),
    MaxI64(i64),
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Self::Halo { .. } => "halo exchange",
            Self::MinF64(_) => "min reduction",
            Self::MaxI64(_) => "max reduction",
        }
    }
}

/// One rank's endpoint of a simulated multi-rank communicator.
///
/// Construct the full set with [`ThreadComm::create`], then move each
/// endpoint onto its rank's thread. The routing table maps every
/// partition in the run to its owning rank, so halo messages can be
/// delivered without global cell IDs.
pub struct ThreadComm {
    rank: u32,
    size: u32,
    /// `senders[r]` delivers to rank `r`; the self slot is never used.
    senders: Vec<Sender<Payload>>,
    /// `receivers[r]` carries envelopes sent by rank `r`.
    receivers: Vec<Receiver<Payload>>,
    routing: Arc<IndexMap<PartitionId, u32>>,
    timeout: Duration,
}

impl ThreadComm {
    /// Wire up `size` communicator endpoints sharing one routing table.
    ///
    /// The returned vector is indexed by rank. Endpoints are independent
    /// and `Send`; drop none of them before the run finishes or peers
    /// will observe [`CommError::Disconnected`].
    pub fn create(size: u32, routing: IndexMap<PartitionId, u32>) -> Vec<ThreadComm> {
        let n = size as usize;
        let routing = Arc::new(routing);

        // One channel per ordered pair (src, dst).
        let mut channels: Vec<Vec<(Sender<Payload>, Receiver<Payload>)>> = (0..n)
            .map(|_| (0..n).map(|_| unbounded()).collect())
            .collect();

        let mut comms = Vec::with_capacity(n);
        for rank in 0..n {
            let senders = (0..n).map(|dst| channels[rank][dst].0.clone()).collect();
            let receivers = (0..n)
                .map(|src| channels[src][rank].1.clone())
                .collect();
            comms.push(ThreadComm {
                rank: rank as u32,
                size,
                senders,
                receivers,
                routing: Arc::clone(&routing),
                timeout: COLLECTIVE_TIMEOUT,
            });
        }
        // Drop the originals so disconnects are observable.
        channels.clear();
        comms
    }

    /// Override the per-peer collective timeout (tests use short values).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Owning rank of a partition, per the routing table.
    pub fn rank_of(&self, partition: PartitionId) -> Option<u32> {
        self.routing.get(&partition).copied()
    }

    fn recv_from(&self, peer: u32, expected: &'static str) -> Result<Payload, CommError> {
        match self.receivers[peer as usize].recv_timeout(self.timeout) {
            Ok(payload) => {
                if payload.kind() != expected {
                    return Err(CommError::ProtocolMismatch {
                        expected,
                        received: payload.kind(),
                    });
                }
                Ok(payload)
            }
            Err(RecvTimeoutError::Timeout) => Err(CommError::Timeout { peer }),
            Err(RecvTimeoutError::Disconnected) => Err(CommError::Disconnected { peer }),
        }
    }

    fn peers(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.size).filter(move |r| *r != self.rank)
    }

    fn broadcast(&self, make: impl Fn(u32) -> Payload) -> Result<(), CommError> {
        for peer in self.peers() {
            self.senders[peer as usize]
                .send(make(peer))
                .map_err(|_| CommError::Disconnected { peer })?;
        }
        Ok(())
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn exchange_halo(
        &self,
        field: FieldTag,
        outgoing: Vec<HaloMessage>,
    ) -> Result<Vec<HaloMessage>, CommError> {
        // Bucket outgoing messages by destination rank. Every peer gets
        // an envelope, empty or not: the collective is unconditional.
        let mut by_rank: Vec<Vec<HaloMessage>> = vec![Vec::new(); self.size as usize];
        for msg in outgoing {
            let Some(dest_rank) = self.rank_of(msg.dest) else {
                return Err(CommError::UnroutablePartition { dest: msg.dest });
            };
            by_rank[dest_rank as usize].push(msg);
        }

        for peer in self.peers() {
            let messages = std::mem::take(&mut by_rank[peer as usize]);
            self.senders[peer as usize]
                .send(Payload::Halo { field, messages })
                .map_err(|_| CommError::Disconnected { peer })?;
        }

        let mut inbound = Vec::new();
        for peer in self.peers() {
            match self.recv_from(peer, "halo exchange")? {
                Payload::Halo {
                    field: peer_field,
                    messages,
                } => {
                    if peer_field != field {
                        return Err(CommError::ProtocolMismatch {
                            expected: "halo exchange",
                            received: "halo exchange (different field)",
                        });
                    }
                    inbound.extend(messages);
                }
                other => {
                    return Err(CommError::ProtocolMismatch {
                        expected: "halo exchange",
                        received: other.kind(),
                    })
                }
            }
        }
        Ok(inbound)
    }

    fn min_f64(&self, local: f64) -> Result<f64, CommError> {
        self.broadcast(|_| Payload::MinF64(local))?;
        let mut global = local;
        for peer in self.peers() {
            match self.recv_from(peer, "min reduction")? {
                Payload::MinF64(v) => global = global.min(v),
                other => {
                    return Err(CommError::ProtocolMismatch {
                        expected: "min reduction",
                        received: other.kind(),
                    })
                }
            }
        }
        Ok(global)
    }

    fn max_i64(&self, local: i64) -> Result<i64, CommError> {
        self.broadcast(|_| Payload::MaxI64(local))?;
        let mut global = local;
        for peer in self.peers() {
            match self.recv_from(peer, "max reduction")? {
                Payload::MaxI64(v) => global = global.max(v),
                other => {
                    return Err(CommError::ProtocolMismatch {
                        expected: "max reduction",
                        received: other.kind(),
                    })
                }
            }
        }
        Ok(global)
    }
}
