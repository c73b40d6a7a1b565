//! # Core Models Module
//!
//! Data structures describing what a trajectory frame contains and which atoms take part in
//! a reweighting run.
//!
//! ## Key Components
//!
//! - [`atom`] - Per-atom attributes used by contribution predicates
//! - [`topology`] - The ordered atom list shared by all frames, with predicate selection
//! - [`frame`] - Coordinates and periodic cell of one trajectory snapshot
//! - [`group`] - Ordered atom index lists partitioned into fixed-size molecule blocks
//!
//! ## Usage
//!
//! ```
//! use mdreweight::core::models::{atom::Atom, group::Group, topology::Topology};
//!
//! let topology = Topology::new(vec![
//!     Atom::new("OW", "SOL", 1),
//!     Atom::new("HW1", "SOL", 1),
//!     Atom::new("HW2", "SOL", 1),
//! ]);
//! let waters = topology.select(|atom| atom.residue_name == "SOL");
//! let group = Group::new(waters, 3).unwrap();
//! assert_eq!(group.num_molecules(), 1);
//! ```

pub mod atom;
pub mod frame;
pub mod group;
pub mod topology;
