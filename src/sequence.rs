/// What to emit for a base outside `A`, `C`, `G`, `T` when complementing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownBasePolicy {
    /// Any other byte (including `N` and lowercase bases) becomes `N`.
    /// Lossy: the original byte cannot be recovered from the output.
    #[default]
    MapToN,
    /// Any other byte is copied through unchanged.
    Preserve,
}

impl UnknownBasePolicy {
    #[inline]
    fn complement(self, base: u8) -> u8 {
        match base {
            b'A' => b'T',
            b'T' => b'A',
            b'G' => b'C',
            b'C' => b'G',
            other => match self {
                UnknownBasePolicy::MapToN => b'N',
                UnknownBasePolicy::Preserve => other,
            },
        }
    }
}

/// DNA 序列反向互补
///
/// - A ↔ T
/// - G ↔ C
/// - 其他字符转为 N (`UnknownBasePolicy::MapToN`)
///
/// Case is taken as received: `a` is not an `A` and maps to `N`.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    reverse_complement_with(seq, UnknownBasePolicy::MapToN)
}

pub fn reverse_complement_with(seq: &[u8], policy: UnknownBasePolicy) -> Vec<u8> {
    seq.iter().rev().map(|&b| policy.complement(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserve_policy_keeps_other_bytes() {
        assert_eq!(reverse_complement_with(b"AxGn", UnknownBasePolicy::Preserve), b"nCxT");
    }

    #[test]
    fn test_default_policy_is_map_to_n() {
        assert_eq!(UnknownBasePolicy::default(), UnknownBasePolicy::MapToN);
        assert_eq!(reverse_complement(b"AxGn"), b"NCNT");
    }
}
