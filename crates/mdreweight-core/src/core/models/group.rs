use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("Molecule size must be at least one atom")]
    ZeroAtomsPerMolecule,
    #[error(
        "Group of {size} atoms cannot be split into molecules of {atoms_per_molecule} atoms"
    )]
    IndivisibleSize {
        size: usize,
        atoms_per_molecule: usize,
    },
}

/// An ordered list of atom indices partitioned into equally sized molecule blocks.
///
/// Blocks are contiguous runs of the list *in the order given*, so the atoms of one molecule
/// need not be contiguous in the topology. A group with one atom per molecule treats every
/// atom as its own molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    indices: Vec<usize>,
    atoms_per_molecule: usize,
}

impl Group {
    /// Creates a group, checking that the list splits evenly into molecules.
    ///
    /// # Arguments
    ///
    /// * `indices` - The 0-based atom indices, in molecule-block order.
    /// * `atoms_per_molecule` - The number of atoms in each molecule block.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::ZeroAtomsPerMolecule`] for a zero block size and
    /// [`GroupError::IndivisibleSize`] if the number of indices is not a multiple of the
    /// block size.
    pub fn new(indices: Vec<usize>, atoms_per_molecule: usize) -> Result<Self, GroupError> {
        if atoms_per_molecule == 0 {
            return Err(GroupError::ZeroAtomsPerMolecule);
        }
        if indices.len() % atoms_per_molecule != 0 {
            return Err(GroupError::IndivisibleSize {
                size: indices.len(),
                atoms_per_molecule,
            });
        }
        Ok(Self {
            indices,
            atoms_per_molecule,
        })
    }

    /// Creates a group where every atom is its own molecule.
    pub fn atoms(indices: Vec<usize>) -> Self {
        Self {
            indices,
            atoms_per_molecule: 1,
        }
    }

    /// Returns the atom indices in block order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the number of atoms in each molecule block.
    pub fn atoms_per_molecule(&self) -> usize {
        self.atoms_per_molecule
    }

    /// Returns the number of atoms in the group.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the group has no atoms.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the number of molecule blocks.
    pub fn num_molecules(&self) -> usize {
        self.indices.len() / self.atoms_per_molecule
    }

    /// Iterates over the molecule blocks.
    pub fn molecules(&self) -> impl Iterator<Item = &[usize]> {
        self.indices.chunks(self.atoms_per_molecule)
    }
}
