use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{DemuxError, Result};

/// The 24 dual-index barcodes (8 bp) of the reference sequencing run.
pub const DEFAULT_INDEXES: [&str; 24] = [
    "GTAGCGTA", "CGATCGAT", "GATCAAGG", "AACAGCGA", "TAGCCATG", "CGGTAATC", "CTCTGGAT",
    "TACCGGAT", "CTAGCTCA", "CACTTCAC", "GCTACTCT", "ACGATCAG", "TATGGCAC", "TGTTCCGT",
    "GTCCTAAG", "TCGACAAG", "TCTTCGAC", "ATCATGCG", "ATCGTGGT", "TCGAGAGT", "TCGGATTC",
    "GATCTTGC", "AGAGTCCA", "AGGATAGC",
];

/// Position of an index within its [`IndexSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexId(usize);

impl IndexId {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Ordered, immutable set of known indexes, all the same length.
#[derive(Debug, Clone)]
pub struct IndexSet {
    indexes: Vec<String>,
    lookup: HashMap<Vec<u8>, IndexId>,
    index_len: usize,
}

impl IndexSet {
    pub fn new<I, S>(indexes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let indexes: Vec<String> = indexes.into_iter().map(Into::into).collect();
        let Some(first) = indexes.first() else {
            return Err(DemuxError::InvalidIndexSet("no indexes given".to_owned()));
        };
        let index_len = first.len();
        if index_len == 0 {
            return Err(DemuxError::InvalidIndexSet("indexes must not be empty".to_owned()));
        }

        let mut lookup = HashMap::with_capacity(indexes.len());
        for (i, index) in indexes.iter().enumerate() {
            if index.len() != index_len {
                return Err(DemuxError::InvalidIndexSet(format!(
                    "\"{index}\" has length {} but \"{first}\" has length {index_len}",
                    index.len()
                )));
            }
            if lookup.insert(index.as_bytes().to_vec(), IndexId(i)).is_some() {
                return Err(DemuxError::InvalidIndexSet(format!("\"{index}\" is listed twice")));
            }
        }

        Ok(IndexSet { indexes, lookup, index_len })
    }

    /// Reads one index per line; blank lines and lines starting with `#` are skipped and
    /// only the first whitespace-separated field of a line is used.
    pub fn parse(text: &str) -> Result<Self> {
        let indexes = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_owned);
        Self::new(indexes)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DemuxError::InvalidIndexSet(format!("could not read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    #[inline]
    pub fn id_of(&self, seq: &[u8]) -> Option<IndexId> {
        self.lookup.get(seq).copied()
    }

    pub fn name(&self, id: IndexId) -> &str {
        &self.indexes[id.0]
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn index_len(&self) -> usize {
        self.index_len
    }

    pub fn ids(&self) -> impl Iterator<Item = IndexId> {
        (0..self.indexes.len()).map(IndexId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndexId, &str)> {
        self.indexes.iter().enumerate().map(|(i, s)| (IndexId(i), s.as_str()))
    }
}

impl Default for IndexSet {
    fn default() -> Self {
        let lookup = DEFAULT_INDEXES
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_bytes().to_vec(), IndexId(i)))
            .collect();
        IndexSet {
            indexes: DEFAULT_INDEXES.iter().map(|s| (*s).to_owned()).collect(),
            lookup,
            index_len: 8,
        }
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} indexes of length {}", self.indexes.len(), self.index_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_is_valid() {
        let set = IndexSet::default();
        let rebuilt = IndexSet::new(DEFAULT_INDEXES).unwrap();
        assert_eq!(set.len(), 24);
        assert!(!set.is_empty());
        assert_eq!(rebuilt.len(), 24);
        assert_eq!(set.index_len(), 8);
        assert_eq!(set.id_of(b"GTAGCGTA"), Some(rebuilt.ids().next().unwrap()));
        assert_eq!(set.name(set.id_of(b"AGGATAGC").unwrap()), "AGGATAGC");
    }

    #[test]
    fn test_rejects_duplicates_and_uneven_lengths() {
        assert!(matches!(IndexSet::new(["ACGT", "ACGT"]), Err(DemuxError::InvalidIndexSet(_))));
        assert!(matches!(IndexSet::new(["ACGT", "ACG"]), Err(DemuxError::InvalidIndexSet(_))));
        assert!(matches!(IndexSet::new(Vec::<String>::new()), Err(DemuxError::InvalidIndexSet(_))));
        assert!(matches!(IndexSet::new([""]), Err(DemuxError::InvalidIndexSet(_))));
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let set = IndexSet::parse("# sample sheet\nAAAA\tsample1\n\n  CCCC \n").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().map(|(_, s)| s).collect::<Vec<_>>(), vec!["AAAA", "CCCC"]);
    }

    #[test]
    fn test_membership_is_exact() {
        let set = IndexSet::default();
        assert!(set.id_of(b"GTAGCGTA").is_some());
        assert!(set.id_of(b"GTAGCGTT").is_none());
        assert!(set.id_of(b"gtagcgta").is_none());
        assert!(set.id_of(b"GTAGCGT").is_none());
    }
}
