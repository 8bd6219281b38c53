use std::collections::BTreeMap;

use crate::classify::Assignment;
use crate::index::{IndexId, IndexSet};

/// Per-run counters, updated once per classified read pair.
///
/// `total_reads` always equals `matched_total() + hopped_total() + unknown()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxCounts {
    total_reads: u64,
    matched: Vec<u64>,
    hopped: BTreeMap<(IndexId, IndexId), u64>,
    unknown: u64,
}

impl DemuxCounts {
    pub fn new(indexes: &IndexSet) -> Self {
        DemuxCounts {
            total_reads: 0,
            matched: vec![0; indexes.len()],
            hopped: BTreeMap::new(),
            unknown: 0,
        }
    }

    /// Counts one read pair. Ids in `assignment` must come from the [`IndexSet`] these
    /// counters were created with.
    pub fn record(&mut self, assignment: &Assignment) {
        self.total_reads += 1;
        match *assignment {
            Assignment::Matched(id) => {
                debug_assert!(id.get() < self.matched.len(), "{id:?} is not in the index set");
                self.matched[id.get()] += 1;
            }
            Assignment::Hopped { index1, index2 } => {
                debug_assert!(
                    index1.get() < self.matched.len() && index2.get() < self.matched.len(),
                    "({index1:?}, {index2:?}) is not in the index set"
                );
                *self.hopped.entry((index1, index2)).or_insert(0) += 1;
            }
            Assignment::Unknown => self.unknown += 1,
        }
    }

    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    pub fn matched(&self, id: IndexId) -> u64 {
        self.matched.get(id.get()).copied().unwrap_or(0)
    }

    /// Count for the ordered pair `index1 -> index2`.
    pub fn hopped(&self, index1: IndexId, index2: IndexId) -> u64 {
        self.hopped.get(&(index1, index2)).copied().unwrap_or(0)
    }

    pub fn unknown(&self) -> u64 {
        self.unknown
    }

    pub fn matched_total(&self) -> u64 {
        self.matched.iter().sum()
    }

    pub fn hopped_total(&self) -> u64 {
        self.hopped.values().sum()
    }

    /// Non-zero hopped pairs ordered by `(index1, index2)` position in the index set.
    pub fn hopped_pairs(&self) -> impl Iterator<Item = (IndexId, IndexId, u64)> + '_ {
        self.hopped.iter().map(|(&(a, b), &n)| (a, b, n))
    }

    /// Matched counts keyed by index sequence, including zeros.
    pub fn matched_by_name(&self, indexes: &IndexSet) -> BTreeMap<String, u64> {
        indexes.iter().map(|(id, name)| (name.to_owned(), self.matched(id))).collect()
    }

    /// Hopped counts as `index1 -> index2 -> count`, only pairs that occurred.
    pub fn hopped_by_name(&self, indexes: &IndexSet) -> BTreeMap<String, BTreeMap<String, u64>> {
        let mut out: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for (a, b, n) in self.hopped_pairs() {
            out.entry(indexes.name(a).to_owned())
                .or_default()
                .insert(indexes.name(b).to_owned(), n);
        }
        out
    }

    pub fn is_consistent(&self) -> bool {
        self.total_reads == self.matched_total() + self.hopped_total() + self.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_assignment_bumps_one_counter() {
        let set = IndexSet::new(["AAAA", "CCCC", "GGGG"]).unwrap();
        let ids: Vec<IndexId> = set.ids().collect();
        let mut counts = DemuxCounts::new(&set);

        counts.record(&Assignment::Matched(ids[0]));
        counts.record(&Assignment::Matched(ids[0]));
        counts.record(&Assignment::Hopped { index1: ids[1], index2: ids[2] });
        counts.record(&Assignment::Unknown);

        assert_eq!(counts.total_reads(), 4);
        assert_eq!(counts.matched(ids[0]), 2);
        assert_eq!(counts.matched(ids[1]), 0);
        assert_eq!(counts.hopped(ids[1], ids[2]), 1);
        assert_eq!(counts.hopped(ids[2], ids[1]), 0);
        assert_eq!(counts.unknown(), 1);
        assert!(counts.is_consistent());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not in the index set")]
    fn test_id_from_another_set_is_rejected() {
        let small = IndexSet::new(["AAAA"]).unwrap();
        let large = IndexSet::new(["AAAA", "CCCC", "GGGG"]).unwrap();
        let foreign = large.ids().last().unwrap();
        let mut counts = DemuxCounts::new(&small);
        counts.record(&Assignment::Matched(foreign));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not in the index set")]
    fn test_hopped_ids_from_another_set_are_rejected() {
        let small = IndexSet::new(["AAAA", "CCCC"]).unwrap();
        let large = IndexSet::new(["AAAA", "CCCC", "GGGG"]).unwrap();
        let ids: Vec<IndexId> = large.ids().collect();
        let mut counts = DemuxCounts::new(&small);
        counts.record(&Assignment::Hopped { index1: ids[0], index2: ids[2] });
    }

    #[test]
    fn test_named_views() {
        let set = IndexSet::new(["AAAA", "CCCC"]).unwrap();
        let ids: Vec<IndexId> = set.ids().collect();
        let mut counts = DemuxCounts::new(&set);
        counts.record(&Assignment::Hopped { index1: ids[1], index2: ids[0] });

        let matched = counts.matched_by_name(&set);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched["AAAA"], 0);

        let hopped = counts.hopped_by_name(&set);
        assert_eq!(hopped["CCCC"]["AAAA"], 1);
        assert!(!hopped.contains_key("AAAA"));
    }
}
