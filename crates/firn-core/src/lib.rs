//! Core types for the Firn ice-sheet time-stepping driver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the strongly-typed identifiers, the step error taxonomy with its
//! never-masking accumulation set, and the per-run step configuration
//! shared across the Firn workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod id;

pub use config::{ConfigError, StepConfig};
pub use error::{StepErrorKind, StepErrors};
pub use id::{FieldTag, PartitionId, RankId, StepId, TimeLevel};
