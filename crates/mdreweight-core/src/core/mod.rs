//! # Core Module
//!
//! The stateless foundation of the library: everything needed to describe a trajectory frame
//! and to turn its coordinates into distance records and perturbation energies.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atom records, topology, frames and atom groups
//! - **Periodic Geometry** ([`geometry`]) - Unit cells and the minimum-image convention
//! - **Distance Queries** ([`distances`]) - All-pairs and per-molecule minimum distances within a cutoff
//! - **Perturbations** ([`perturbation`]) - Built-in distance-to-energy functions
//! - **Trajectory Access** ([`io`]) - The `Trajectory` collaborator trait and an in-memory implementation

pub mod distances;
pub mod geometry;
pub mod io;
pub mod models;
pub mod perturbation;
