//! Double-buffered prognostic state for the Firn driver.
//!
//! [`PrognosticState`] holds the two time levels of the prognostic
//! thickness fields and swaps them after each successful step, in the
//! manner of a ping-pong arena: the old level is readable and frozen for
//! the duration of a step, the new level is the exclusive write target of
//! the prognostic update stage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod state;
pub mod tendency;

pub use state::{PrognosticState, StateLevel};
pub use tendency::Tendency;
