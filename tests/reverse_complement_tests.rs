use dual_index_demux::{reverse_complement, reverse_complement_with, UnknownBasePolicy};

#[test]
fn test_reverse_complement_basic() {
    // 基本 ATGC 转换
    let input = b"ATGC";
    let expected = b"GCAT";
    let result = reverse_complement(input);
    assert_eq!(result, expected);
}

#[test]
fn test_reverse_complement_lowercase() {
    // 小写字母不会转大写, 视为未知碱基
    let input = b"atgc";
    let expected = b"NNNN";
    let result = reverse_complement(input);
    assert_eq!(result, expected);
}

#[test]
fn test_reverse_complement_with_n() {
    // 测试包含 N（未知碱基）
    let input = b"ATGCN";
    let expected = b"NGCAT";
    let result = reverse_complement(input);
    assert_eq!(result, expected);
}

#[test]
fn test_reverse_complement_unknown_bases() {
    // 未知碱基（非 ATGC）会被转换为 N
    let input = b"ATXGC";
    let expected = b"GCNAT";
    let result = reverse_complement(input);
    assert_eq!(result, expected);
}

#[test]
fn test_reverse_complement_preserve_policy() {
    let input = b"ATXGC";
    let expected = b"GCXAT";
    let result = reverse_complement_with(input, UnknownBasePolicy::Preserve);
    assert_eq!(result, expected);
}

#[test]
fn test_reverse_complement_empty() {
    let input = b"";
    let expected = b"";
    let result = reverse_complement(input);
    assert_eq!(result, expected);
}

#[test]
fn test_reverse_complement_long_sequence() {
    let input = b"AAATTTGGGCCC";
    let expected = b"GGGCCCAAATTT";
    let result = reverse_complement(input);
    assert_eq!(result, expected);
}

#[test]
fn test_reverse_complement_palindrome() {
    // ACGT 与 EcoRI 切点都是回文
    assert_eq!(reverse_complement(b"ACGT"), b"ACGT");
    assert_eq!(reverse_complement(b"GAATTC"), b"GAATTC");
}

#[test]
fn test_reverse_complement_is_an_involution() {
    let bases = [b'A', b'C', b'G', b'T', b'N'];
    // every sequence of length 0..=4 over ACGTN
    let mut seqs: Vec<Vec<u8>> = vec![Vec::new()];
    for len in 1..=4 {
        let mut next = Vec::new();
        for seq in seqs.iter().filter(|s| s.len() == len - 1) {
            for &b in &bases {
                let mut longer = seq.clone();
                longer.push(b);
                next.push(longer);
            }
        }
        seqs.extend(next);
    }
    assert_eq!(seqs.len(), 1 + 5 + 25 + 125 + 625);
    for seq in &seqs {
        assert_eq!(&reverse_complement(&reverse_complement(seq)), seq);
    }
}

#[test]
fn test_default_indexes_round_trip() {
    for index in dual_index_demux::DEFAULT_INDEXES {
        let rc = reverse_complement(index.as_bytes());
        assert_eq!(reverse_complement(&rc), index.as_bytes());
    }
}
