use super::atom::Atom;

/// The ordered list of atoms shared by every frame of a trajectory.
///
/// Atom indices are 0-based positions in this list and are identical to the positions of the
/// corresponding coordinates in each [`Frame`](super::frame::Frame).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    atoms: Vec<Atom>,
}

impl Topology {
    /// Creates a topology from an ordered list of atoms.
    ///
    /// # Arguments
    ///
    /// * `atoms` - The atoms, in the same order as the frame coordinates.
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Returns the number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Returns `true` if the topology contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Retrieves an atom by index.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the index is in range, otherwise `None`.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Returns all atoms as a slice.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Selects the indices of all atoms satisfying a predicate, in topology order.
    ///
    /// # Arguments
    ///
    /// * `predicate` - The test applied to every atom.
    ///
    /// # Return
    ///
    /// The ascending list of matching atom indices.
    pub fn select<P>(&self, predicate: P) -> Vec<usize>
    where
        P: Fn(&Atom) -> bool,
    {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| predicate(atom))
            .map(|(index, _)| index)
            .collect()
    }

    /// Selects the indices of all atoms belonging to the given residue number.
    ///
    /// # Arguments
    ///
    /// * `residue_number` - The residue sequence number to match.
    pub fn select_residue(&self, residue_number: isize) -> Vec<usize> {
        self.select(|atom| atom.residue_number == residue_number)
    }
}

impl FromIterator<Atom> for Topology {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
