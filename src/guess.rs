//! Attribution queries: deciding which of the concatenated records a query
//! (or a pair of queries) belongs to.
//!
//! These routines are speculative by design: instead of propagating errors
//! they report failure through sentinel return values, so a caller can fire
//! them at arbitrary read data without wrapping every call.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::index::{CompressedIndex, Orientation};
use crate::{Error, Idx, SeqId};

impl CompressedIndex {
    /// Guess which record uniquely contains `query`.
    ///
    /// With `rounds == 0` the whole query is consumed deterministically.
    /// Otherwise up to `rounds` independent attempts are made, each anchored
    /// at a start position drawn uniformly from the query, returning on the
    /// first attempt that pins a single record.
    ///
    /// Returns `(ordinal, count)` on success, `(-1, 0)` when every attempt
    /// failed, `(-1, count)` when the deterministic attempt was ambiguous,
    /// `(-2, 0)` when an unknown symbol was hit and nothing succeeded, and
    /// `(0, -1)` when the index carries no attribution data (single-record
    /// build, or restored from disk).
    pub fn guess<R: Rng>(&self, query: &[u8], rounds: usize, rng: &mut R) -> (i64, i64) {
        if self.ssa.is_empty() {
            return (0, -1);
        }
        if query.is_empty() {
            return (-1, 0);
        }
        if rounds == 0 {
            return self.guess_at(query, query.len() - 1);
        }
        let mut saw_unknown = false;
        for _ in 0..rounds {
            let start = rng.gen_range(0..query.len());
            let (seq, count) = self.guess_at(query, start);
            if seq >= 0 {
                return (seq, count);
            }
            if seq == -2 {
                saw_unknown = true;
            }
        }
        if saw_unknown {
            (-2, 0)
        } else {
            (-1, 0)
        }
    }

    /// Guess the record shared by a query pair.
    ///
    /// With `rounds == 0` both queries are reduced deterministically;
    /// otherwise each round draws independent start positions for both
    /// queries and accepts when they agree. When only one of the two queries
    /// was ever attributable, that record is returned as a last resort.
    /// Returns `-1` on failure.
    pub fn guess_pair<R: Rng>(&self, q1: &[u8], q2: &[u8], rounds: usize, rng: &mut R) -> i64 {
        if q1.is_empty() || q2.is_empty() {
            return -1;
        }
        if rounds == 0 {
            let (s1, _) = self.guess(q1, 0, rng);
            let (s2, _) = self.guess(q2, 0, rng);
            return match (s1 >= 0, s2 >= 0) {
                (true, true) if s1 == s2 => s1,
                (true, false) => s1,
                (false, true) => s2,
                _ => -1,
            };
        }
        let mut best1 = -1i64;
        let mut best2 = -1i64;
        for _ in 0..rounds {
            let (s1, _) = self.guess_at(q1, rng.gen_range(0..q1.len()));
            let (s2, _) = self.guess_at(q2, rng.gen_range(0..q2.len()));
            if s1 >= 0 && s1 == s2 {
                return s1;
            }
            if s1 >= 0 {
                best1 = s1;
            }
            if s2 >= 0 {
                best2 = s2;
            }
        }
        match (best1 >= 0, best2 >= 0) {
            (true, false) => best1,
            (false, true) => best2,
            _ => -1,
        }
    }

    /// Paired localization with position consistency.
    ///
    /// Each round anchors both queries at random start positions, collects
    /// candidate records with their text positions, and accepts every record
    /// seen by both queries at distance `max_insert` or less. The first
    /// non-empty acceptance set is returned; after `rounds` fruitless rounds
    /// the result is empty.
    pub fn find_genome<R: Rng>(
        &self,
        q1: &[u8],
        q2: &[u8],
        rounds: usize,
        max_insert: Idx,
        rng: &mut R,
    ) -> HashSet<SeqId> {
        if q1.is_empty() || q2.is_empty() {
            return HashSet::new();
        }
        let bound1 = q1.len().saturating_sub(10).max(1);
        let bound2 = q2.len().saturating_sub(10).max(1);
        for _ in 0..rounds {
            let hits1 = self.flex_search(q1, rng.gen_range(0..bound1));
            let hits2 = self.flex_search(q2, rng.gen_range(0..bound2));
            let accepted = paired_records(&hits1, &hits2, max_insert);
            if !accepted.is_empty() {
                return accepted;
            }
        }
        HashSet::new()
    }

    /// Deterministic variant of [`find_genome`]: instead of randomizing, the
    /// anchor walks positions 15, 16, ... up to the shorter query length.
    ///
    /// [`find_genome`]: CompressedIndex::find_genome
    pub fn find_genome_d(&self, q1: &[u8], q2: &[u8], max_insert: Idx) -> HashSet<SeqId> {
        let max = q1.len().min(q2.len());
        for pos in 15..max {
            let hits1 = self.flex_search(q1, pos);
            let hits2 = self.flex_search(q2, pos);
            let accepted = paired_records(&hits1, &hits2, max_insert);
            if !accepted.is_empty() {
                return accepted;
            }
        }
        HashSet::new()
    }

    /// Single deterministic attribution attempt over `query[..=start]`.
    fn guess_at(&self, query: &[u8], start: usize) -> (i64, i64) {
        if self.ssa.is_empty() {
            return (0, -1);
        }
        let narrowed = match self.orientation {
            Orientation::Forward => self.narrow_backward(&query[..=start]),
            Orientation::Reversed => self.narrow_forward(&query[..=start]),
        };
        let (sp, ep) = match narrowed {
            Ok((sp, ep, _)) => (sp, ep),
            Err(Error::UnknownSymbol(_)) => return (-2, 0),
            Err(_) => return (-1, 0),
        };
        if sp > ep {
            return (-1, 0);
        }
        let (sp, ep) = (sp as usize, ep as usize);
        let first = self.ssa[sp];
        if self.ssa[sp + 1..=ep].iter().any(|&s| s != first) {
            return (-1, (ep - sp + 1) as i64);
        }
        (first as i64, (ep - sp + 1) as i64)
    }

    /// Narrow over `query[start..]` until the candidate set is small, then
    /// map each surviving row's record ordinal to its text position. Empty
    /// when attribution data or the suffix array is unavailable, when the
    /// interval collapses, or when an unknown symbol is hit.
    pub(crate) fn flex_search(&self, query: &[u8], start: usize) -> HashMap<SeqId, Idx> {
        let mut hits = HashMap::new();
        if self.ssa.is_empty() || self.sa.is_empty() || start >= query.len() {
            return hits;
        }
        let slice = &query[start..];
        let limit = self.candidate_limit;
        let narrowed = match self.orientation {
            Orientation::Reversed => self.flex_forward(slice, limit),
            Orientation::Forward => self.flex_backward(slice, limit),
        };
        if let Some((sp, ep)) = narrowed {
            if sp <= ep && ep - sp <= limit {
                for i in sp as usize..=ep as usize {
                    hits.insert(self.ssa[i], self.sa[i]);
                }
            }
        }
        hits
    }

    fn flex_forward(&self, slice: &[u8], limit: Idx) -> Option<(Idx, Idx)> {
        let mut i = 0;
        let (mut sp, mut ep) = self.init(slice[i]).ok()?;
        while sp <= ep && i + 1 < slice.len() && ep - sp > limit {
            i += 1;
            (sp, ep) = self.step(slice[i], sp, ep).ok()?;
        }
        Some((sp, ep))
    }

    /// Start-anchored growth for a forward-oriented index. The candidate
    /// pattern `slice[..=end]` extends to the right, which backward search
    /// cannot do incrementally, so every extension re-narrows the prefix
    /// from scratch. The early stop therefore fires at the same pattern
    /// length as `flex_forward` does on a reversed index.
    fn flex_backward(&self, slice: &[u8], limit: Idx) -> Option<(Idx, Idx)> {
        let (mut sp, mut ep) = self.init(slice[0]).ok()?;
        let mut end = 0;
        while sp <= ep && end + 1 < slice.len() && ep - sp > limit {
            end += 1;
            (sp, ep) = match self.narrow_backward(&slice[..=end]) {
                Ok((sp, ep, _)) => (sp, ep),
                Err(_) => return None,
            };
        }
        Some((sp, ep))
    }
}

fn paired_records(
    hits1: &HashMap<SeqId, Idx>,
    hits2: &HashMap<SeqId, Idx>,
    max_insert: Idx,
) -> HashSet<SeqId> {
    let mut accepted = HashSet::new();
    for (&record, &p1) in hits1 {
        if let Some(&p2) = hits2.get(&record) {
            if (p1 - p2).abs() <= max_insert {
                accepted.insert(record);
            }
        }
    }
    accepted
}
