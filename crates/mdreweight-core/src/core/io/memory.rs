use super::traits::{FrameIter, Trajectory};
use crate::core::models::atom::Atom;
use crate::core::models::frame::Frame;
use crate::core::models::topology::Topology;
use std::convert::Infallible;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryTrajectoryError {
    #[error("Frame {frame} has {found} atoms but the topology has {expected}")]
    AtomCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
}

/// A trajectory whose frames are held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryTrajectory {
    topology: Topology,
    frames: Vec<Frame>,
}

impl InMemoryTrajectory {
    /// Creates a trajectory, checking that every frame has one position per atom.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryTrajectoryError::AtomCountMismatch`] for the first frame whose atom
    /// count differs from the topology.
    pub fn new(atoms: Vec<Atom>, frames: Vec<Frame>) -> Result<Self, MemoryTrajectoryError> {
        let topology = Topology::new(atoms);
        if let Some((frame, found)) = frames
            .iter()
            .map(Frame::num_atoms)
            .enumerate()
            .find(|&(_, n)| n != topology.len())
        {
            return Err(MemoryTrajectoryError::AtomCountMismatch {
                frame,
                expected: topology.len(),
                found,
            });
        }
        Ok(Self { topology, frames })
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn push(&mut self, frame: Frame) -> Result<(), MemoryTrajectoryError> {
        if frame.num_atoms() != self.topology.len() {
            return Err(MemoryTrajectoryError::AtomCountMismatch {
                frame: self.frames.len(),
                expected: self.topology.len(),
                found: frame.num_atoms(),
            });
        }
        self.frames.push(frame);
        Ok(())
    }
}

impl Trajectory for InMemoryTrajectory {
    type Error = Infallible;

    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn frames(&self) -> FrameIter<'_, Self::Error> {
        Box::new(self.frames.iter().cloned().map(Ok))
    }
}
