//! Periodic all-pairs and minimum-distance queries.
//!
//! Both queries work on [`CoordinateSet`]s gathered from a single frame and never keep state
//! between calls. Atom identity (the global atom index) is carried alongside the coordinates
//! so that an atom is never paired with itself, even when both sets come from the same group.

use crate::core::geometry::UnitCell;
use crate::core::models::frame::Frame;
use crate::core::models::group::Group;
use itertools::Itertools;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistanceError {
    #[error("Atom index {index} is out of range for a frame of {num_atoms} atoms")]
    IndexOutOfRange { index: usize, num_atoms: usize },
}

/// The coordinates of one group in one frame.
#[derive(Debug, Clone)]
pub struct CoordinateSet<'a> {
    indices: &'a [usize],
    positions: Vec<Point3<f64>>,
    atoms_per_molecule: usize,
}

impl<'a> CoordinateSet<'a> {
    pub fn gather(group: &'a Group, frame: &Frame) -> Result<Self, DistanceError> {
        let positions = group
            .indices()
            .iter()
            .map(|&index| {
                frame
                    .position(index)
                    .copied()
                    .ok_or(DistanceError::IndexOutOfRange {
                        index,
                        num_atoms: frame.num_atoms(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            indices: group.indices(),
            positions,
            atoms_per_molecule: group.atoms_per_molecule(),
        })
    }

    /// Global atom index of the `local`-th atom of the set.
    #[inline]
    pub fn atom_index(&self, local: usize) -> usize {
        self.indices[local]
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn num_molecules(&self) -> usize {
        self.positions.len() / self.atoms_per_molecule
    }

    fn molecule_range(&self, molecule: usize) -> std::ops::Range<usize> {
        let start = molecule * self.atoms_per_molecule;
        start..start + self.atoms_per_molecule
    }
}

/// A pair of atoms closer than the cutoff.
///
/// `i` indexes the first set and `j` the second set (or the first set again when only one
/// set was given).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDistance {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
}

/// The closest approach between two molecule blocks.
///
/// `i` and `j` are the local indices of the atoms realizing the minimum. Blocks sharing an
/// atom are flagged `same_molecule` and report a zero distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumDistance {
    pub reference_molecule: usize,
    pub target_molecule: usize,
    pub i: usize,
    pub j: usize,
    pub distance: f64,
    pub within_cutoff: bool,
    pub same_molecule: bool,
}

impl MinimumDistance {
    /// Whether this record should contribute to an accumulated energy.
    #[inline]
    pub fn counts(&self) -> bool {
        self.within_cutoff && !self.same_molecule
    }
}

#[inline]
fn distance_squared(cell: &UnitCell, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    cell.distance_squared(b - a)
}

/// Visits every pair of distinct atoms whose minimum-image distance is within `cutoff`.
///
/// With a single set, each unordered pair is visited once. With two sets, every
/// combination of one atom from each set is visited, skipping combinations that refer to the
/// same atom.
pub fn for_each_pair_within<F>(
    first: &CoordinateSet,
    second: Option<&CoordinateSet>,
    cell: &UnitCell,
    cutoff: f64,
    mut visit: F,
) where
    F: FnMut(PairDistance),
{
    let cutoff_squared = cutoff * cutoff;
    let mut emit = |i: usize, j: usize, d2: f64| {
        if d2 <= cutoff_squared {
            visit(PairDistance {
                i,
                j,
                distance: d2.sqrt(),
            });
        }
    };

    match second {
        None => {
            for (i, j) in (0..first.len()).tuple_combinations() {
                if first.atom_index(i) == first.atom_index(j) {
                    continue;
                }
                let d2 = distance_squared(cell, &first.positions[i], &first.positions[j]);
                emit(i, j, d2);
            }
        }
        Some(second) => {
            for (i, a) in first.positions.iter().enumerate() {
                for (j, b) in second.positions.iter().enumerate() {
                    if first.atom_index(i) == second.atom_index(j) {
                        continue;
                    }
                    emit(i, j, distance_squared(cell, a, b));
                }
            }
        }
    }
}

/// Collects the output of [`for_each_pair_within`].
pub fn pairs_within(
    first: &CoordinateSet,
    second: Option<&CoordinateSet>,
    cell: &UnitCell,
    cutoff: f64,
) -> Vec<PairDistance> {
    let mut pairs = Vec::new();
    for_each_pair_within(first, second, cell, cutoff, |pair| pairs.push(pair));
    pairs
}

/// Computes the minimum distance between molecule blocks.
///
/// With a single set, one record is produced for every unordered pair of distinct blocks.
/// With two sets, one record is produced for every (reference block, target block)
/// combination. Records are returned for all block pairs; `within_cutoff` tells whether the
/// minimum lies inside `cutoff`.
pub fn minimum_distances(
    reference: &CoordinateSet,
    target: Option<&CoordinateSet>,
    cell: &UnitCell,
    cutoff: f64,
) -> Vec<MinimumDistance> {
    let cutoff_squared = cutoff * cutoff;
    let (target, block_pairs): (&CoordinateSet, Vec<(usize, usize)>) = match target {
        None => (
            reference,
            (0..reference.num_molecules()).tuple_combinations().collect(),
        ),
        Some(target) => (
            target,
            (0..reference.num_molecules())
                .cartesian_product(0..target.num_molecules())
                .collect(),
        ),
    };

    block_pairs
        .into_iter()
        .map(|(reference_molecule, target_molecule)| {
            closest_approach(
                reference,
                reference_molecule,
                target,
                target_molecule,
                cell,
                cutoff_squared,
            )
        })
        .collect()
}

fn closest_approach(
    reference: &CoordinateSet,
    reference_molecule: usize,
    target: &CoordinateSet,
    target_molecule: usize,
    cell: &UnitCell,
    cutoff_squared: f64,
) -> MinimumDistance {
    let reference_atoms = reference.molecule_range(reference_molecule);
    let target_atoms = target.molecule_range(target_molecule);

    let shared = reference_atoms.clone().cartesian_product(target_atoms.clone()).find(
        |&(i, j)| reference.atom_index(i) == target.atom_index(j),
    );
    if let Some((i, j)) = shared {
        return MinimumDistance {
            reference_molecule,
            target_molecule,
            i,
            j,
            distance: 0.0,
            within_cutoff: true,
            same_molecule: true,
        };
    }

    let (i, j, d2) = reference_atoms
        .cartesian_product(target_atoms)
        .map(|(i, j)| {
            let d2 = distance_squared(cell, &reference.positions[i], &target.positions[j]);
            (i, j, d2)
        })
        .fold(
            (usize::MAX, usize::MAX, f64::INFINITY),
            |best, candidate| if candidate.2 < best.2 { candidate } else { best },
        );

    MinimumDistance {
        reference_molecule,
        target_molecule,
        i,
        j,
        distance: d2.sqrt(),
        within_cutoff: d2 <= cutoff_squared,
        same_molecule: false,
    }
}
