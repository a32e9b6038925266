use std::io::Write;
use std::path::PathBuf;

use rand::Rng;
use tempfile::TempDir;

/// Write `records` as a FASTA file inside a fresh temporary directory and
/// return both; dropping the directory removes the file and any index
/// directory saved next to it.
pub fn fasta_file(records: &[(&str, &[u8])]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.fasta");
    let mut file = std::fs::File::create(&path).unwrap();
    for (id, seq) in records {
        writeln!(file, ">{}", id).unwrap();
        for chunk in seq.chunks(60) {
            file.write_all(chunk).unwrap();
            writeln!(file).unwrap();
        }
    }
    (dir, path)
}

pub fn random_dna<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    random_seq(rng, b"ACGT", len)
}

/// A uniformly random sequence over `alphabet`.
#[allow(dead_code)] // not every test binary needs a custom alphabet
pub fn random_seq<R: Rng>(rng: &mut R, alphabet: &[u8], len: usize) -> Vec<u8> {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Random substrings of `text`, between 1 and `max_len` bytes.
#[allow(dead_code)] // not every test binary samples substrings
pub fn random_substrings<R: Rng>(
    rng: &mut R,
    text: &[u8],
    count: usize,
    max_len: usize,
) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| {
            let start = rng.gen_range(0..text.len());
            let len = rng.gen_range(1..=(text.len() - start).min(max_len));
            text[start..start + len].to_vec()
        })
        .collect()
}
