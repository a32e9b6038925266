use std::path::PathBuf;

use rayon::prelude::*;

use crate::fasta::{Fasta, SENTINEL, SEPARATOR};
use crate::sais;
use crate::{Error, Idx, SeqId};

/// Interval width at which the paired-localization search stops narrowing
/// and inspects candidate rows directly.
pub(crate) const DEFAULT_CANDIDATE_LIMIT: Idx = 10;

/// Text orientation baked into an index at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Index the concatenated records as-is; queries are consumed from their
    /// last symbol to their first.
    Forward,
    /// Index the reversed concatenation, so that consuming a query from its
    /// first symbol onward performs BWT backward search. Sub-sequence
    /// ordinals are adjusted to stay in original record order.
    Reversed,
}

/// A compressed FM-index over the `|`-separated, `$`-terminated
/// concatenation of one or more FASTA records.
///
/// All arrays are filled during construction and never mutated afterwards,
/// so a single index can serve concurrent queries without synchronization.
pub struct CompressedIndex {
    pub(crate) seq: Vec<u8>,
    pub(crate) bwt: Vec<u8>,
    pub(crate) sa: Vec<Idx>,
    pub(crate) ssa: Vec<SeqId>,
    pub(crate) occ: Vec<Vec<Idx>>,
    pub(crate) symbols: Vec<u8>,
    pub(crate) freq: Box<[Idx; 256]>,
    pub(crate) c: Box<[Idx; 256]>,
    pub(crate) ep: Box<[Idx; 256]>,
    pub(crate) len: Idx,
    pub(crate) occ_size: Idx,
    pub(crate) end_pos: Idx,
    pub(crate) m: Idx,
    pub(crate) orientation: Orientation,
    pub(crate) candidate_limit: Idx,
    pub(crate) ids: Vec<String>,
    pub(crate) lens: Vec<Idx>,
    pub(crate) input_file: Option<PathBuf>,
}

impl CompressedIndex {
    pub(crate) fn build(
        fasta: Fasta,
        multiple: bool,
        m: Idx,
        orientation: Orientation,
        input_file: Option<PathBuf>,
    ) -> Result<CompressedIndex, Error> {
        let Fasta {
            ids,
            lens,
            mut payload,
        } = fasta;
        let records = ids.len();
        if multiple && records > SeqId::MAX as usize + 1 {
            return Err(Error::Argument(format!(
                "{} records exceed the {}-record attribution limit",
                records,
                SeqId::MAX as usize + 1
            )));
        }
        if orientation == Orientation::Reversed {
            payload.reverse();
        }
        let mut seq = payload;
        seq.push(SENTINEL);

        let n = seq.len();
        let len = n as Idx;
        let occ_size = (n.div_ceil(m as usize) + 1) as Idx;

        let sa_raw = sais::build_suffix_array(&seq);

        // Sub-sequence ordinal per text position; the separator belongs to
        // the record preceding it. Freed as soon as SSA is final.
        let sid = if multiple {
            let mut sid = Vec::with_capacity(n);
            let mut s: SeqId = 0;
            for &b in &seq {
                sid.push(s);
                if b == SEPARATOR {
                    s += 1;
                }
            }
            sid
        } else {
            Vec::new()
        };

        let mut freq = Box::new([0 as Idx; 256]);
        let mut bwt = vec![0u8; n];
        let mut sa = Vec::with_capacity(n);
        let mut ssa = Vec::with_capacity(if multiple { n } else { 0 });
        let mut end_pos = 0 as Idx;
        let last_ordinal = records.saturating_sub(1) as SeqId;
        for (i, &p) in sa_raw.iter().enumerate() {
            freq[seq[i] as usize] += 1;
            let b = if p == 0 { seq[n - 1] } else { seq[p - 1] };
            bwt[i] = b;
            if b == SENTINEL {
                end_pos = i as Idx;
            }
            sa.push(p as Idx);
            if multiple {
                ssa.push(match orientation {
                    Orientation::Forward => sid[p],
                    Orientation::Reversed => last_ordinal - sid[p],
                });
            }
        }
        drop(sid);
        drop(sa_raw);

        let mut symbols = Vec::new();
        for b in 0..=255u8 {
            if freq[b as usize] > 0 {
                symbols.push(b);
            }
        }

        let mut c = Box::new([0 as Idx; 256]);
        let mut ep = Box::new([0 as Idx; 256]);
        for w in 1..symbols.len() {
            let (prev, cur) = (symbols[w - 1] as usize, symbols[w] as usize);
            c[cur] = c[prev] + freq[prev];
        }
        for &s in &symbols {
            ep[s as usize] = c[s as usize] + freq[s as usize] - 1;
        }

        // Per-symbol fan-out; each worker scans the finished BWT on its own.
        let rows: Vec<(u8, Vec<Idx>)> = symbols
            .par_iter()
            .map(|&s| (s, occ_row(&bwt, s, m, occ_size as usize)))
            .collect();
        let mut occ: Vec<Vec<Idx>> = vec![Vec::new(); 256];
        for (s, row) in rows {
            occ[s as usize] = row;
        }

        Ok(CompressedIndex {
            seq,
            bwt,
            sa,
            ssa,
            occ,
            symbols,
            freq,
            c,
            ep,
            len,
            occ_size,
            end_pos,
            m,
            orientation,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            ids,
            lens,
            input_file,
        })
    }

    /// Number of occurrences of `symbol` in `BWT[0..=pos]`; `occurrence(c, -1)`
    /// is 0. Combines the sampled row with a walk over at most `M - 1` BWT
    /// bytes.
    pub fn occurrence(&self, symbol: u8, pos: Idx) -> Idx {
        if pos < 0 {
            return 0;
        }
        let k = pos / self.m;
        let mut count = self.occ[symbol as usize][k as usize];
        for j in (k * self.m + 1)..=pos {
            if self.bwt[j as usize] == symbol {
                count += 1;
            }
        }
        count
    }

    pub(crate) fn contains(&self, symbol: u8) -> bool {
        self.freq[symbol as usize] > 0
    }

    /// Length of the indexed text, including separators and the sentinel.
    pub fn len(&self) -> Idx {
        self.len
    }

    /// Sampling interval of the occurrence table.
    pub fn compression_ratio(&self) -> Idx {
        self.m
    }

    /// The sorted alphabet of the indexed text.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Number of occurrences of `symbol` in the whole text.
    pub fn frequency(&self, symbol: u8) -> Idx {
        self.freq[symbol as usize]
    }

    /// The Burrows-Wheeler transform of the indexed text.
    pub fn bwt(&self) -> &[u8] {
        &self.bwt
    }

    /// The suffix array; empty after a count-only reload.
    pub fn suffix_array(&self) -> &[Idx] {
        &self.sa
    }

    /// Row of the suffix array holding the sentinel suffix's predecessor,
    /// i.e. the unique `i` with `BWT[i] == b'$'`.
    pub fn end_position(&self) -> Idx {
        self.end_pos
    }

    /// The orientation this index was built with.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Record identifiers, in original order; empty after a reload.
    pub fn sequence_ids(&self) -> &[String] {
        &self.ids
    }

    /// Per-record payload lengths; empty after a reload.
    pub fn sequence_lens(&self) -> &[Idx] {
        &self.lens
    }

    /// Adjust the interval width at which paired localization stops
    /// narrowing and inspects candidate rows (10 by default). Lower values
    /// narrow further before attributing; 0 narrows until the interval is a
    /// single row or the query is exhausted.
    pub fn with_candidate_limit(mut self, limit: Idx) -> CompressedIndex {
        self.candidate_limit = limit.max(0);
        self
    }

    /// Re-search the stored text against the index, returning the resulting
    /// interval. `None` when the text was not persisted (reload with a
    /// save option below 2).
    pub fn self_check(&self) -> Option<(Idx, Idx)> {
        if self.seq.len() < 2 {
            return None;
        }
        let body = &self.seq[..self.seq.len() - 1];
        let query: Vec<u8> = match self.orientation {
            Orientation::Forward => body.to_vec(),
            Orientation::Reversed => body.iter().rev().copied().collect(),
        };
        self.search(&query).ok().map(|m| m.range())
    }
}

fn occ_row(bwt: &[u8], symbol: u8, m: Idx, occ_size: usize) -> Vec<Idx> {
    let m = m as usize;
    let mut row = vec![0 as Idx; occ_size];
    let mut count = 0 as Idx;
    for (j, &b) in bwt.iter().enumerate() {
        if b == symbol {
            count += 1;
        }
        if j % m == 0 {
            row[j / m] = count;
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_banana_tables() {
        let index = testutil::build_index(&[("b", b"banana")], 1, false, Orientation::Forward);
        assert_eq!(index.len(), 7);
        assert_eq!(index.symbols(), b"$abn");
        assert_eq!(index.suffix_array(), [6, 5, 3, 1, 0, 4, 2]);
        assert_eq!(index.bwt(), b"annb$aa");
        assert_eq!(index.end_position(), 4);
        for (c, freq, start, end) in [(b'$', 1, 0, 0), (b'a', 3, 1, 3), (b'b', 1, 4, 4), (b'n', 2, 5, 6)]
        {
            assert_eq!(index.frequency(c), freq, "freq of {}", c as char);
            assert_eq!(index.c[c as usize], start, "C of {}", c as char);
            assert_eq!(index.ep[c as usize], end, "EP of {}", c as char);
        }
    }

    #[test]
    fn test_intervals_partition_text() {
        let mut rng = StdRng::seed_from_u64(3);
        let text = testutil::random_dna(&mut rng, 300);
        let index = testutil::build_index(&[("r", &text)], 4, false, Orientation::Forward);
        let mut expected_start = 0;
        for &s in index.symbols() {
            assert_eq!(index.c[s as usize], expected_start);
            assert_eq!(
                index.ep[s as usize],
                index.c[s as usize] + index.frequency(s) - 1
            );
            expected_start = index.ep[s as usize] + 1;
        }
        assert_eq!(expected_start, index.len());
    }

    #[test]
    fn test_bwt_matches_suffix_array() {
        let mut rng = StdRng::seed_from_u64(4);
        let text = testutil::random_dna(&mut rng, 200);
        let index = testutil::build_index(&[("r", &text)], 3, false, Orientation::Forward);
        let n = index.len() as usize;
        for i in 0..n {
            let p = index.suffix_array()[i] as usize;
            let expected = index.seq[(p + n - 1) % n];
            assert_eq!(index.bwt()[i], expected);
        }
    }

    #[test]
    fn test_occurrence_matches_prefix_counts() {
        let mut rng = StdRng::seed_from_u64(5);
        let text = testutil::random_dna(&mut rng, 200);
        for m in [1, 2, 3, 7, 64] {
            let index = testutil::build_index(&[("r", &text)], m, false, Orientation::Forward);
            let mut counts = [0 as Idx; 256];
            for (p, &b) in index.bwt().iter().enumerate() {
                counts[b as usize] += 1;
                for &s in index.symbols() {
                    assert_eq!(
                        index.occurrence(s, p as Idx),
                        counts[s as usize],
                        "occurrence({}, {}) with M = {}",
                        s as char,
                        p,
                        m
                    );
                }
            }
            for &s in index.symbols() {
                assert_eq!(index.occurrence(s, -1), 0);
            }
        }
    }

    #[test]
    fn test_ssa_forward() {
        let index =
            testutil::build_index(&[("s0", b"ACGT"), ("s1", b"ACGA")], 1, true, Orientation::Forward);
        // T = ACGT|ACGA$; positions 0..=4 belong to record 0, 5..=9 to record 1.
        let n = index.len() as usize;
        for i in 0..n {
            let p = index.suffix_array()[i];
            let expected = if p <= 4 { 0 } else { 1 };
            assert_eq!(index.ssa[i], expected, "row {} (text position {})", i, p);
        }
    }

    #[test]
    fn test_ssa_reversed_keeps_original_ordinals() {
        let index = testutil::build_index(
            &[("s0", b"AACC"), ("s1", b"GGTT")],
            1,
            true,
            Orientation::Reversed,
        );
        // Indexed text is TTGG|CCAA$; rows holding G or T positions must
        // still attribute to record 1, rows holding A or C to record 0.
        let n = index.len() as usize;
        for i in 0..n {
            let p = index.suffix_array()[i] as usize;
            match index.seq[p] {
                b'G' | b'T' => assert_eq!(index.ssa[i], 1),
                b'A' | b'C' => assert_eq!(index.ssa[i], 0),
                b'|' => assert_eq!(index.ssa[i], 1),
                b'$' => assert_eq!(index.ssa[i], 0),
                other => panic!("unexpected symbol {}", other as char),
            }
        }
    }

    #[test]
    fn test_too_many_records_for_attribution() {
        let records: Vec<(String, Vec<u8>)> = (0..(SeqId::MAX as usize + 2))
            .map(|i| (format!("r{}", i), b"A".to_vec()))
            .collect();
        let fasta = crate::Fasta::from_records(records).unwrap();
        let result = crate::IndexBuilder::new().multiple(true).build(fasta);
        assert!(matches!(result, Err(Error::Argument(_))));
    }

    #[test]
    fn test_occ_row_snapshots() {
        let bwt = b"annb$aa";
        let row = occ_row(bwt, b'a', 2, 5);
        // snapshots at positions 0, 2, 4, 6
        assert_eq!(row, vec![1, 1, 1, 3, 0]);
    }

    #[test]
    fn test_self_check_finds_whole_text() {
        let index =
            testutil::build_index(&[("s0", b"ACGT"), ("s1", b"ACGA")], 2, true, Orientation::Forward);
        let (sp, ep) = index.self_check().unwrap();
        assert_eq!(ep - sp + 1, 1);

        let reversed = testutil::build_index(
            &[("s0", b"ACGT"), ("s1", b"ACGA")],
            2,
            true,
            Orientation::Reversed,
        );
        let (sp, ep) = reversed.self_check().unwrap();
        assert_eq!(ep - sp + 1, 1);
    }
}
