use crate::counts::DemuxCounts;
use crate::index::IndexSet;

/// Matched read pairs for one sample index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub index: String,
    pub count: u64,
    pub percent: f64,
}

/// Read pairs whose index 1 was `from` and whose resolved index 2 was `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct HopRow {
    pub from: String,
    pub to: String,
    pub count: u64,
    pub percent: f64,
}

/// Report-ready view of the final counts. All percentages are of `total_reads`.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_reads: u64,
    pub matched_total: u64,
    pub hopped_total: u64,
    pub unknown: u64,
    /// Every index, most matched first; ties keep index set order.
    pub per_index: Vec<IndexRow>,
    /// Observed hopped pairs, most frequent first; ties keep index set order.
    pub hopped_pairs: Vec<HopRow>,
}

/// Percentage of `total`, or 0 when there is nothing to divide by.
pub fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

impl Summary {
    pub fn new(indexes: &IndexSet, counts: &DemuxCounts) -> Self {
        let total = counts.total_reads();

        let mut per_index: Vec<IndexRow> = indexes
            .iter()
            .map(|(id, name)| {
                let count = counts.matched(id);
                IndexRow { index: name.to_owned(), count, percent: percent_of(count, total) }
            })
            .collect();
        per_index.sort_by(|a, b| b.count.cmp(&a.count));

        let mut hopped_pairs: Vec<HopRow> = counts
            .hopped_pairs()
            .map(|(a, b, count)| HopRow {
                from: indexes.name(a).to_owned(),
                to: indexes.name(b).to_owned(),
                count,
                percent: percent_of(count, total),
            })
            .collect();
        hopped_pairs.sort_by(|a, b| b.count.cmp(&a.count));

        Summary {
            total_reads: total,
            matched_total: counts.matched_total(),
            hopped_total: counts.hopped_total(),
            unknown: counts.unknown(),
            per_index,
            hopped_pairs,
        }
    }

    pub fn matched_percent(&self) -> f64 {
        percent_of(self.matched_total, self.total_reads)
    }

    pub fn hopped_percent(&self) -> f64 {
        percent_of(self.hopped_total, self.total_reads)
    }

    pub fn unknown_percent(&self) -> f64 {
        percent_of(self.unknown, self.total_reads)
    }

    /// The `n` most frequent hopped pairs.
    pub fn top_hopped(&self, n: usize) -> &[HopRow] {
        &self.hopped_pairs[..n.min(self.hopped_pairs.len())]
    }
}
