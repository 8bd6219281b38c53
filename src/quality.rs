//! Phred quality decoding and the mean-quality filter applied to index reads.

/// Offset between an ASCII quality character and its Phred score.
pub const PHRED_OFFSET: i64 = 33;

/// Decodes one quality character. Characters below `!` yield negative scores; no range check.
#[inline]
pub fn phred_score(ch: u8) -> i64 {
    i64::from(ch) - PHRED_OFFSET
}

/// Returns true when the mean Phred score of `qual` is at least `cutoff`.
///
/// Computed as `sum >= cutoff * len` in `i128`, so no division or rounding is involved and
/// the product is exact for any `cutoff`. An empty quality string always passes.
pub fn passes_mean_quality(qual: &[u8], cutoff: i64) -> bool {
    let total: i128 = qual.iter().map(|&ch| i128::from(phred_score(ch))).sum();
    total >= i128::from(cutoff) * qual.len() as i128
}
