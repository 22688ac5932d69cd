// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Longest increasing subsequence.
//!
//! The keyed list reconciler records, for every slot of the new list, the
//! (one-based) position of the old child it reuses, with `0` meaning "newly
//! mounted". Children whose slots lie on a longest strictly increasing run of
//! that table are already in the right relative order and stay where they
//! are. Everything else is moved.

use alloc::vec::Vec;

/// Returns the positions in `seq` of one longest strictly increasing
/// subsequence, in ascending order.
///
/// Zero entries are never part of the result. Runs in O(n log n) using
/// patience sorting with a predecessor table.
#[must_use]
pub fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    // `tails[k]` is the position of the smallest value ending an increasing
    // run of length `k + 1`.
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor = alloc::vec![usize::MAX; seq.len()];

    for (i, &value) in seq.iter().enumerate() {
        if value == 0 {
            continue;
        }
        if let Some(&last) = tails.last() {
            if seq[last] < value {
                predecessor[i] = last;
                tails.push(i);
                continue;
            }
        } else {
            tails.push(i);
            continue;
        }

        // First run whose tail is not smaller than `value`.
        let k = tails.partition_point(|&t| seq[t] < value);
        if value < seq[tails[k]] {
            if k > 0 {
                predecessor[i] = tails[k - 1];
            }
            tails[k] = i;
        }
    }

    let mut result = alloc::vec![0; tails.len()];
    let mut cursor = tails.last().copied().unwrap_or(usize::MAX);
    for slot in result.iter_mut().rev() {
        *slot = cursor;
        cursor = predecessor[cursor];
    }
    result
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    /// Quadratic reference: length of the longest strictly increasing run
    /// over non-zero entries.
    fn reference_len(seq: &[usize]) -> usize {
        let mut best = vec![0_usize; seq.len()];
        for i in 0..seq.len() {
            if seq[i] == 0 {
                continue;
            }
            best[i] = 1;
            for j in 0..i {
                if seq[j] != 0 && seq[j] < seq[i] {
                    best[i] = best[i].max(best[j] + 1);
                }
            }
        }
        best.into_iter().max().unwrap_or(0)
    }

    fn assert_valid(seq: &[usize]) {
        let run = longest_increasing_subsequence(seq);
        assert_eq!(run.len(), reference_len(seq), "not longest for {seq:?}");
        for pair in run.windows(2) {
            assert!(pair[0] < pair[1], "positions out of order for {seq:?}");
            assert!(seq[pair[0]] < seq[pair[1]], "values not increasing for {seq:?}");
        }
        assert!(run.iter().all(|&i| seq[i] != 0), "zero included for {seq:?}");
    }

    #[test]
    fn mixed_sequence() {
        let seq = [2, 0, 4, 1, 3];
        assert_eq!(longest_increasing_subsequence(&seq), vec![3, 4]);
        assert_valid(&seq);
    }

    #[test]
    fn all_zero_is_empty() {
        assert!(longest_increasing_subsequence(&[0, 0, 0]).is_empty());
        assert!(longest_increasing_subsequence(&[]).is_empty());
    }

    #[test]
    fn sorted_input_is_kept_whole() {
        assert_eq!(
            longest_increasing_subsequence(&[1, 2, 3, 4]),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn reversed_input_keeps_one() {
        assert_eq!(longest_increasing_subsequence(&[4, 3, 2, 1]).len(), 1);
    }

    #[test]
    fn matches_reference_on_assorted_inputs() {
        let cases: &[&[usize]] = &[
            &[3, 1, 2],
            &[0, 5, 0, 6, 1, 2, 3],
            &[2, 2, 2],
            &[5, 1, 6, 2, 7, 3, 8],
            &[1, 0, 2, 0, 3],
            &[9, 8, 1, 7, 2, 6, 3, 5, 4],
        ];
        for seq in cases {
            assert_valid(seq);
        }
    }
}
