//! SA-IS implementation based on
//!    Ge Nong, Sen Zhang, & Wai Hong Chan. (2010). Two Efficient Algorithms for Linear Time Suffix Array Construction.
//!    IEEE Transactions on Computers, 60(10), 1471-1484. <https://doi.org/10.1109/tc.2010.188>
//!
//! Specialized for texts terminated by a unique, lexicographically smallest
//! sentinel (the `$` appended by the sequence loader).
use vers_vecs::BitVec;

/// Build the suffix array of `text` using the SA-IS algorithm.
///
/// The last symbol of `text` must be strictly smaller than every other
/// symbol. Runs in linear time and linear working space.
pub fn build_suffix_array(text: &[u8]) -> Vec<usize> {
    let n = text.len();
    match n {
        0 => vec![],
        1 => vec![0],
        _ => {
            debug_assert!(
                text[..n - 1].iter().all(|&c| c > text[n - 1]),
                "the text must end with a unique smallest sentinel",
            );
            let mut sa = vec![usize::MAX; n];
            sais(text, 256, &mut sa);
            sa
        }
    }
}

fn count_symbols<T: Copy + Into<usize>>(text: &[T], alphabet_len: usize) -> Vec<usize> {
    let mut occs = vec![0; alphabet_len];
    for &c in text {
        occs[c.into()] += 1;
    }
    occs
}

fn bucket_start_pos(occs: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    let mut buckets = vec![0; occs.len()];
    for (&occ, b) in occs.iter().zip(buckets.iter_mut()) {
        *b = sum;
        sum += occ;
    }
    buckets
}

fn bucket_end_pos(occs: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    let mut buckets = vec![0; occs.len()];
    for (&occ, b) in occs.iter().zip(buckets.iter_mut()) {
        sum += occ;
        *b = sum;
    }
    buckets
}

fn classify<T: Copy + Into<usize>>(text: &[T]) -> (BitVec, Vec<usize>) {
    let n = text.len();
    // 1 => S-type, 0 => L-type
    let mut types = BitVec::from_zeros(n);
    types.set(n - 1, 1).unwrap();

    if n == 1 {
        return (types, vec![]);
    }

    let mut lms = vec![n - 1];
    let mut prev_is_s_type = false;
    for i in (0..(n - 1)).rev() {
        // text[i] is S-type if either holds:
        //     - text[i] <  text[i + 1]
        //     - text[i] == text[i + 1] and text[i + 1] is S-type.
        // Otherwise, text[i] is L-type.
        let is_s_type = text[i].into() < text[i + 1].into()
            || (text[i].into() == text[i + 1].into() && prev_is_s_type);
        if is_s_type {
            types.set(i, 1).unwrap();
        } else if prev_is_s_type {
            // text[i + 1] is LMS-type (leftmost-S) if text[i] is L-type and text[i + 1] is S-type.
            lms.push(i + 1);
        }
        prev_is_s_type = is_s_type;
    }
    (types, lms)
}

fn is_lms(types: &BitVec, i: usize) -> bool {
    i > 0
        && i < usize::MAX
        && types.is_bit_set(i).unwrap()
        && !types.is_bit_set(i - 1).unwrap()
}

fn induced_sort<T: Copy + Into<usize>>(
    text: &[T],
    types: &BitVec,
    occs: &[usize],
    sa: &mut [usize],
) {
    let n = text.len();
    let mut start_pos = bucket_start_pos(occs);
    for i in 0..n {
        let j = sa[i];
        if 0 < j && j < usize::MAX && !types.is_bit_set(j - 1).unwrap() {
            let c: usize = text[j - 1].into();
            let p = start_pos[c];
            sa[p] = j - 1;
            start_pos[c] += 1;
        }
    }

    let mut end_pos = bucket_end_pos(occs);
    for i in (0..n).rev() {
        let j = sa[i];
        if j != 0 && j != usize::MAX && types.is_bit_set(j - 1).unwrap() {
            let c: usize = text[j - 1].into();
            let p = end_pos[c] - 1;
            sa[p] = j - 1;
            end_pos[c] = p;
        }
    }
}

#[allow(clippy::cognitive_complexity)]
fn sais<T: Copy + Into<usize>>(text: &[T], alphabet_len: usize, sa: &mut [usize]) {
    let n = text.len();
    let (types, lms) = classify(text);
    let lms_len = lms.len();
    let occs = count_symbols(text, alphabet_len);

    // Step 1. Seed LMS suffixes at their bucket ends.
    let mut end_pos = bucket_end_pos(&occs);
    for &i in lms.iter().rev() {
        let c: usize = text[i].into();
        let k = end_pos[c] - 1;
        sa[k] = i;
        end_pos[c] = k;
    }

    // Step 2. Type-L
    // Step 3. Type-S
    induced_sort(text, &types, &occs, sa);

    // Move the sorted LMS substrings into the first items of `sa`.
    let mut k = 0;
    for i in 0..n {
        let p = sa[i];
        if is_lms(&types, p) {
            sa[k] = p;
            k += 1;
            if k == lms_len {
                break;
            }
        }
    }

    let mut name = 1;
    {
        // Put lexicographic names of LMS substrings into `names`
        // in the order of SA.
        //
        //      sa_lms         names
        //    +--------+--------------------+
        // sa |        |**n0**n1************|
        //    +--------+--------------------+
        //     <------> <------------------>
        //     lms_len      names.len >= sa.len / 2 (Lemma 4.10)
        let (sa_lms, names) = sa.split_at_mut(lms_len);
        for nm in names.iter_mut() {
            *nm = usize::MAX;
        }
        names[sa_lms[0] / 2] = 0; // name of the sentinel
        if lms_len <= 1 {
            debug_assert!(lms_len != 0);
        } else {
            names[sa_lms[1] / 2] = 1; // name of the second least LMS substring
            for i in 2..lms_len {
                let p = sa_lms[i - 1];
                let q = sa_lms[i];
                let mut d = 1;
                let mut same = text[p].into() == text[q].into()
                    && types.is_bit_set(p) == types.is_bit_set(q);
                while same {
                    if text[p + d].into() != text[q + d].into()
                        || types.is_bit_set(p + d) != types.is_bit_set(q + d)
                    {
                        same = false;
                        break;
                    } else if is_lms(&types, p + d) && is_lms(&types, q + d) {
                        break;
                    }
                    d += 1;
                }
                if !same {
                    name += 1;
                }
                names[q / 2] = name;
            }
        }
        for s in sa_lms.iter_mut() {
            *s = usize::MAX;
        }
    }

    // Compact the names to the tail of `sa`, keeping text order.
    let mut i = sa.len() - 1;
    let mut j = 0;
    while j < lms_len {
        if sa[i] != usize::MAX {
            sa[sa.len() - 1 - j] = sa[i];
            j += 1;
        }
        i -= 1;
    }

    {
        //     sa1                 s1
        //    +-------------------+---------+
        // sa |                   |  names  |
        //    +-------------------+---------+
        //                         <------->
        //                          lms_len
        let (sa1, s1) = sa.split_at_mut(sa.len() - lms_len);
        if name < lms_len {
            // Names of LMS substrings are not unique.
            // Compute the suffix array of the name string into `sa1`.
            sais(s1, name + 1, sa1);
        } else {
            // Names of LMS substrings are unique.
            // The suffix array of the name string is the order of the names.
            for (i, &s) in s1.iter().enumerate() {
                sa1[s] = i;
            }
        }

        // Populate P1 (`p1`) with the positions of LMS substrings and remap
        // the reduced suffix array back to text positions.
        let p1 = s1;
        for (j, i) in lms.into_iter().rev().enumerate() {
            p1[j] = i;
        }
        for i in 0..lms_len {
            sa1[i] = p1[sa1[i]];
        }
    }

    for i in &mut sa[lms_len..] {
        *i = usize::MAX;
    }

    // Seed the now fully sorted LMS suffixes and induce the rest.
    let mut end_pos = bucket_end_pos(&occs);
    for i in (0..lms_len).rev() {
        let j = sa[i];
        sa[i] = usize::MAX;
        let c: usize = text[j].into();
        let k = end_pos[c] - 1;
        sa[k] = j;
        end_pos[c] = k;
    }
    induced_sort(text, &types, &occs, sa);
}
