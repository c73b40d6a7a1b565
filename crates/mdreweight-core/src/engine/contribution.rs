use crate::core::models::atom::Atom;

pub type AtomPredicate<'a> = Box<dyn Fn(&Atom) -> bool + Send + Sync + 'a>;

/// Restricts which atoms of each group may contribute to the perturbation energy.
///
/// A distance counts only if its group 1 atom passes the group 1 predicate and its group 2
/// atom passes the group 2 predicate. A missing predicate accepts every atom. In minimum
/// distance mode the atoms tested are the two atoms realizing the minimum.
#[derive(Default)]
pub struct ContributionFilter<'a> {
    group_1: Option<AtomPredicate<'a>>,
    group_2: Option<AtomPredicate<'a>>,
}

impl<'a> ContributionFilter<'a> {
    /// A filter accepting every atom of both groups.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn group_1<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Atom) -> bool + Send + Sync + 'a,
    {
        self.group_1 = Some(Box::new(predicate));
        self
    }

    pub fn group_2<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Atom) -> bool + Send + Sync + 'a,
    {
        self.group_2 = Some(Box::new(predicate));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.group_1.is_none() && self.group_2.is_none()
    }

    #[inline]
    pub fn accepts(&self, atom_1: &Atom, atom_2: &Atom) -> bool {
        self.group_1.as_ref().is_none_or(|p| p(atom_1))
            && self.group_2.as_ref().is_none_or(|p| p(atom_2))
    }
}

impl std::fmt::Debug for ContributionFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContributionFilter")
            .field("group_1", &self.group_1.is_some())
            .field("group_2", &self.group_2.is_some())
            .finish()
    }
}
