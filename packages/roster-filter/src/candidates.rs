//! Candidate sets

use std::collections::BTreeSet;

use roster_storage::Uid;

/// Enrollee uids still possibly matching every constraint processed so far
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CandidateSet {
    /// Nothing constrained yet: the whole enrollee universe, never computed
    #[default]
    Unconstrained,
    Known(BTreeSet<Uid>),
}

impl CandidateSet {
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, CandidateSet::Unconstrained)
    }

    /// Size of a known set; `None` while unconstrained
    pub fn len(&self) -> Option<usize> {
        match self {
            CandidateSet::Unconstrained => None,
            CandidateSet::Known(uids) => Some(uids.len()),
        }
    }

    /// True only for a known, empty set
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Known and strictly smaller than `threshold`
    pub fn is_below(&self, threshold: usize) -> bool {
        self.len().is_some_and(|n| n < threshold)
    }

    pub fn uids(&self) -> Option<&BTreeSet<Uid>> {
        match self {
            CandidateSet::Unconstrained => None,
            CandidateSet::Known(uids) => Some(uids),
        }
    }

    /// Narrow by a freshly matched set
    ///
    /// An unconstrained set simply becomes `matched`.
    pub fn intersect(self, matched: BTreeSet<Uid>) -> Self {
        match self {
            CandidateSet::Unconstrained => CandidateSet::Known(matched),
            CandidateSet::Known(mut current) => {
                current.retain(|uid| matched.contains(uid));
                CandidateSet::Known(current)
            }
        }
    }
}

impl FromIterator<Uid> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Uid>>(iter: I) -> Self {
        CandidateSet::Known(iter.into_iter().collect())
    }
}
