/// Represents the identity of one atom in a simulated system.
///
/// Atom records do not carry coordinates; positions change every frame and are stored in
/// [`Frame`](super::frame::Frame). The attributes here are stable for the whole trajectory
/// and are what contribution predicates inspect when deciding whether a distance counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "OW", "HW1").
    pub name: String,
    /// The name of the residue this atom belongs to (e.g., "ALA", "SOL").
    pub residue_name: String,
    /// The residue sequence number as written by the simulation package.
    pub residue_number: isize,
    /// The segment or chain label, empty when the topology does not define one.
    pub segment: String,
}

impl Atom {
    /// Creates a new `Atom` with an empty segment label.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_name` - The name of the parent residue.
    /// * `residue_number` - The sequence number of the parent residue.
    pub fn new(name: &str, residue_name: &str, residue_number: isize) -> Self {
        Self {
            name: name.to_string(),
            residue_name: residue_name.to_string(),
            residue_number,
            segment: String::new(),
        }
    }

    /// Returns a copy of this atom with the given segment label.
    ///
    /// # Arguments
    ///
    /// * `segment` - The segment or chain label to assign.
    pub fn with_segment(mut self, segment: &str) -> Self {
        self.segment = segment.to_string();
        self
    }

    /// Returns `true` if the atom name is one of the given names.
    ///
    /// This is the common shape of contribution predicates, e.g. restricting a perturbation
    /// to water hydrogens with `atom.name_in(&["HW1", "HW2"])`.
    ///
    /// # Arguments
    ///
    /// * `names` - The accepted atom names.
    pub fn name_in(&self, names: &[&str]) -> bool {
        names.iter().any(|&n| n == self.name)
    }
}
