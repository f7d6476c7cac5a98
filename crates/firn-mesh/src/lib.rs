//! Mesh partitions and domain decomposition types for the Firn driver.
//!
//! A [`Domain`] owns an ordered collection of [`Partition`]s — the mesh
//! subdomains assigned to this rank — plus the communicator handle for
//! the run. Each partition bundles its [`Mesh`] (read-only vertical
//! structure), its double-buffered prognostic state, its per-step
//! tendency buffer, and the [`HaloMap`] describing which boundary cells
//! it exports to and imports from its neighbors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod halo;
pub mod mesh;

pub use domain::{Domain, Partition};
pub use halo::{HaloMap, HaloPatch};
pub use mesh::{Mesh, MeshError};
