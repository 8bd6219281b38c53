use std::fmt;

use crate::index::{IndexId, IndexSet};
use crate::quality::passes_mean_quality;
use crate::sequence::reverse_complement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Matched,
    Hopped,
    Unknown,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Category::Matched => "matched",
            Category::Hopped => "hopped",
            Category::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Where a read pair goes, with the resolved index ids for matched and hopped pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Matched(IndexId),
    Hopped { index1: IndexId, index2: IndexId },
    Unknown,
}

impl Assignment {
    pub fn category(&self) -> Category {
        match self {
            Assignment::Matched(_) => Category::Matched,
            Assignment::Hopped { .. } => Category::Hopped,
            Assignment::Unknown => Category::Unknown,
        }
    }
}

/// Classifier output: the assignment plus the resolved index sequences used in the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub assignment: Assignment,
    /// Index 1 as read.
    pub index1: Vec<u8>,
    /// Index 2 after reverse complement.
    pub index2: Vec<u8>,
}

impl Classification {
    pub fn category(&self) -> Category {
        self.assignment.category()
    }

    /// `<index1>-<index2>`, appended to both read headers.
    pub fn tag(&self) -> Vec<u8> {
        let mut tag = Vec::with_capacity(self.index1.len() + self.index2.len() + 1);
        tag.extend_from_slice(&self.index1);
        tag.push(b'-');
        tag.extend_from_slice(&self.index2);
        tag
    }
}

/// Assigns read pairs to a category from their two index reads.
///
/// Both index reads must be exact members of the index set and each must have a mean
/// quality of at least `cutoff`; otherwise the pair is unknown. Qualifying pairs are
/// matched when the two indexes agree and hopped when they differ.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    indexes: &'a IndexSet,
    cutoff: i64,
}

impl<'a> Classifier<'a> {
    pub fn new(indexes: &'a IndexSet, cutoff: i64) -> Self {
        Classifier { indexes, cutoff }
    }

    pub fn classify(
        &self,
        index1_raw: &[u8],
        index2_raw: &[u8],
        qual1: &[u8],
        qual2: &[u8],
    ) -> Classification {
        let index2 = reverse_complement(index2_raw);
        let assignment = self.assign(index1_raw, &index2, qual1, qual2);
        Classification { assignment, index1: index1_raw.to_vec(), index2 }
    }

    fn assign(&self, index1: &[u8], index2: &[u8], qual1: &[u8], qual2: &[u8]) -> Assignment {
        let (Some(id1), Some(id2)) = (self.indexes.id_of(index1), self.indexes.id_of(index2))
        else {
            return Assignment::Unknown;
        };
        if !passes_mean_quality(qual1, self.cutoff) || !passes_mean_quality(qual2, self.cutoff) {
            return Assignment::Unknown;
        }
        if id1 == id2 {
            Assignment::Matched(id1)
        } else {
            Assignment::Hopped { index1: id1, index2: id2 }
        }
    }
}
