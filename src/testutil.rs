//! Naive reference implementations and generators shared by the unit tests.

use rand::Rng;

use crate::index::{CompressedIndex, Orientation};
use crate::{Fasta, Idx, IndexBuilder};

/// Build an index over in-memory records, panicking on failure.
pub fn build_index<S: AsRef<[u8]>>(
    records: &[(&str, S)],
    m: Idx,
    multiple: bool,
    orientation: Orientation,
) -> CompressedIndex {
    let fasta = Fasta::from_records(records.iter().map(|(id, seq)| (*id, seq.as_ref()))).unwrap();
    IndexBuilder::new()
        .compression_ratio(m)
        .multiple(multiple)
        .orientation(orientation)
        .build(fasta)
        .unwrap()
}

/// The `|`-joined, `$`-terminated text the index is built over.
pub fn concat(records: &[&[u8]]) -> Vec<u8> {
    let mut text = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            text.push(b'|');
        }
        text.extend_from_slice(record);
    }
    text.push(b'$');
    text
}

/// Compute the suffix array by sorting all suffixes.
pub fn naive_suffix_array(text: &[u8]) -> Vec<usize> {
    let mut sa: Vec<usize> = (0..text.len()).collect();
    sa.sort_by_key(|&i| &text[i..]);
    sa
}

/// Count the occurrences of `pattern` in `text` by scanning.
pub fn naive_count(text: &[u8], pattern: &[u8]) -> usize {
    naive_positions(text, pattern).len()
}

/// Starting positions of `pattern` in `text`, ascending.
pub fn naive_positions(text: &[u8], pattern: &[u8]) -> Vec<Idx> {
    if pattern.is_empty() || pattern.len() > text.len() {
        return vec![];
    }
    text.windows(pattern.len())
        .enumerate()
        .filter(|(_, w)| *w == pattern)
        .map(|(i, _)| i as Idx)
        .collect()
}

/// A uniformly random DNA string.
pub fn random_dna<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect()
}
