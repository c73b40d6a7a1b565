use crate::core::models::frame::Frame;
use crate::core::models::topology::Topology;
use std::error::Error;

/// A boxed, one-pass iterator over the frames of a trajectory.
pub type FrameIter<'a, E> = Box<dyn Iterator<Item = Result<Frame, E>> + Send + 'a>;

/// Defines the interface for reading frames from a molecular-dynamics trajectory.
///
/// Implementors own the underlying resource (a file, a decoder, a buffer). The reweighting
/// driver only needs the topology, the number of frames, and a forward-only pass over the
/// frames; every call to [`Trajectory::frames`] starts a new pass from the first frame.
pub trait Trajectory {
    /// The error type produced while reading or decoding a frame.
    type Error: Error + Send + Sync + 'static;

    /// Returns the atoms shared by all frames.
    fn topology(&self) -> &Topology;

    /// Returns the number of frames in the trajectory.
    fn len(&self) -> usize;

    /// Returns `true` if the trajectory contains no frames.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a new pass over the frames, in increasing frame order.
    ///
    /// # Errors
    ///
    /// Each item is an error if that frame could not be read or decoded.
    fn frames(&self) -> FrameIter<'_, Self::Error>;
}
