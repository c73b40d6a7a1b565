use crate::core::distances::{self, CoordinateSet, DistanceError};
use crate::core::models::frame::Frame;
use crate::core::models::group::Group;
use crate::core::models::topology::Topology;
use crate::core::perturbation::Perturbation;
use crate::engine::config::DistanceMode;
use crate::engine::contribution::ContributionFilter;
use crate::engine::error::EngineError;
use tracing::trace;

/// Names used for the first and second group in error reports.
pub const GROUP_LABELS: [&str; 2] = ["group_1", "group_2"];

/// The atoms whose distances make up a frame's perturbation energy.
#[derive(Debug, Clone, Copy)]
pub enum Interaction<'a> {
    /// Distances between members of one group.
    Single(&'a Group),
    /// Distances from members of the first group to members of the second.
    Pair(&'a Group, &'a Group),
}

impl<'a> Interaction<'a> {
    pub fn groups(&self) -> [Option<&'a Group>; 2] {
        match *self {
            Interaction::Single(group) => [Some(group), None],
            Interaction::Pair(group_1, group_2) => [Some(group_1), Some(group_2)],
        }
    }
}

pub struct FrameEnergyTask<'a, P: Perturbation> {
    pub topology: &'a Topology,
    pub interaction: Interaction<'a>,
    pub mode: DistanceMode,
    pub cutoff: f64,
    pub perturbation: &'a P,
    pub filter: &'a ContributionFilter<'a>,
}

impl<P: Perturbation> FrameEnergyTask<'_, P> {
    /// Sums the perturbation over the qualifying distances of one frame.
    pub fn run(&self, frame_index: usize, frame: &Frame) -> Result<f64, EngineError> {
        if frame.num_atoms() != self.topology.len() {
            return Err(EngineError::FrameSize {
                frame: frame_index,
                expected: self.topology.len(),
                found: frame.num_atoms(),
            });
        }

        let (first, second) = match self.interaction {
            Interaction::Single(group) => (gather(group, frame, GROUP_LABELS[0])?, None),
            Interaction::Pair(group_1, group_2) => (
                gather(group_1, frame, GROUP_LABELS[0])?,
                Some(gather(group_2, frame, GROUP_LABELS[1])?),
            ),
        };
        let second_ref = second.as_ref();
        let target = second_ref.unwrap_or(&first);
        let cell = frame.unit_cell();
        let atoms = self.topology.atoms();

        let accepts = |i: usize, j: usize| {
            self.filter.is_unrestricted()
                || self
                    .filter
                    .accepts(&atoms[first.atom_index(i)], &atoms[target.atom_index(j)])
        };

        let energy = match self.mode {
            DistanceMode::AllPairs => {
                let mut energy = 0.0;
                distances::for_each_pair_within(&first, second_ref, cell, self.cutoff, |pair| {
                    if accepts(pair.i, pair.j) {
                        energy += self.perturbation.energy(pair.distance);
                    }
                });
                energy
            }
            DistanceMode::MinimumPerMolecule => {
                distances::minimum_distances(&first, second_ref, cell, self.cutoff)
                    .into_iter()
                    .filter(|record| record.counts() && accepts(record.i, record.j))
                    .map(|record| self.perturbation.energy(record.distance))
                    .sum()
            }
        };

        trace!(frame = frame_index, energy, "Frame perturbation energy computed.");
        Ok(energy)
    }
}

fn gather<'a>(
    group: &'a Group,
    frame: &Frame,
    label: &'static str,
) -> Result<CoordinateSet<'a>, EngineError> {
    CoordinateSet::gather(group, frame).map_err(
        |DistanceError::IndexOutOfRange { index, num_atoms }| EngineError::AtomIndexOutOfRange {
            group: label,
            index,
            num_atoms,
        },
    )
}
