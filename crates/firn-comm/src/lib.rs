//! Collective communication primitives for the Firn driver.
//!
//! This crate defines the [`Communicator`] trait — the seam through which
//! the time-integration driver talks to its distributed-memory peers —
//! plus two implementations: [`LocalComm`] for single-rank runs and
//! [`ThreadComm`], a channel-wired multi-rank communicator used to
//! exercise the collective-symmetry invariants without a real MPI stack.
//!
//! Every method on [`Communicator`] is collective: all ranks of a run
//! must issue the same call, in the same order, or the run deadlocks.
//! [`ThreadComm`] converts the two most common violations into errors
//! instead of hangs: mismatched collective kinds surface as
//! [`CommError::ProtocolMismatch`], and a silent peer surfaces as
//! [`CommError::Timeout`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod comm;
pub mod local;
pub mod thread;

pub use comm::{CommError, Communicator, HaloMessage};
pub use local::LocalComm;
pub use thread::ThreadComm;
