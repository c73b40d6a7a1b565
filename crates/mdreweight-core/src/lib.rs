//! # mdreweight Core Library
//!
//! Estimates how a hypothetical, distance-based energy perturbation would reweight the
//! frames of a molecular-dynamics trajectory. For every frame the perturbation is summed over
//! the selected interatomic distances, turned into a Boltzmann factor, and normalized into a
//! probability distribution over frames.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Atom`, `Topology`, `Frame`, `Group`),
//!   periodic geometry (`UnitCell`), the pairwise/minimum-distance adapter, the perturbation
//!   function library, and the `Trajectory` collaborator trait.
//!
//! - **[`engine`]: The Logic Core.** Run configuration, errors, progress reporting, the
//!   per-frame energy accumulator, and the immutable `ReweightResult`.
//!
//! - **[`workflows`]: The Public API.** The reweighting driver with its single-group and
//!   two-group entry points.
//!
//! ## Example
//!
//! ```
//! use mdreweight::core::geometry::UnitCell;
//! use mdreweight::core::io::memory::InMemoryTrajectory;
//! use mdreweight::core::models::{atom::Atom, frame::Frame, group::Group};
//! use mdreweight::core::perturbation::gaussian_decay;
//! use mdreweight::engine::config::{DistanceMode, ReweightConfig};
//! use nalgebra::Point3;
//!
//! let atoms = vec![Atom::new("OW", "SOL", 1), Atom::new("OW", "SOL", 2)];
//! let cell = UnitCell::orthorhombic(20.0, 20.0, 20.0).unwrap();
//! let frames = vec![
//!     Frame::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)], cell.clone()),
//!     Frame::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)], cell),
//! ];
//! let trajectory = InMemoryTrajectory::new(atoms, frames).unwrap();
//!
//! let group = Group::new(vec![0, 1], 1).unwrap();
//! let config = ReweightConfig::builder().mode(DistanceMode::AllPairs).build().unwrap();
//! let result =
//!     mdreweight::reweight(&trajectory, gaussian_decay(0.1, 1.0), &group, &config).unwrap();
//!
//! assert_eq!(result.len(), 2);
//! assert!((result.probability().iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! ```

pub mod core;
pub mod engine;
pub mod workflows;

pub use workflows::reweight::{reweight, reweight_pair};
