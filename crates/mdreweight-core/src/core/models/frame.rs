use crate::core::geometry::UnitCell;
use nalgebra::Point3;

/// One time-sampled snapshot of atomic coordinates and the periodic cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    positions: Vec<Point3<f64>>,
    unit_cell: UnitCell,
}

impl Frame {
    /// Creates a frame from coordinates indexed by atom and the cell valid for this frame.
    ///
    /// # Arguments
    ///
    /// * `positions` - The coordinates of every atom, in topology order.
    /// * `unit_cell` - The periodic cell of this snapshot.
    pub fn new(positions: Vec<Point3<f64>>, unit_cell: UnitCell) -> Self {
        Self {
            positions,
            unit_cell,
        }
    }

    /// Returns the coordinates of all atoms.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Returns the coordinates of a single atom, or `None` if the index is out of range.
    pub fn position(&self, index: usize) -> Option<&Point3<f64>> {
        self.positions.get(index)
    }

    /// Returns the periodic cell of this frame.
    pub fn unit_cell(&self) -> &UnitCell {
        &self.unit_cell
    }

    /// Returns the number of atoms in this frame.
    pub fn num_atoms(&self) -> usize {
        self.positions.len()
    }
}
