//! Contiguous block partitioning.
//!
//! Rank `r` of `P` receives `[r*q, (r+1)*q)` with `q = N / P`; the last rank
//! also takes the remainder. The split is not balanced: the last rank can hold
//! up to `P - 1` more items than the others, and when `N < P` it holds all of
//! them.

use std::ops::Range;

/// Index range of `n` items owned by `rank` out of `parts` ranks.
///
/// `parts == 0` is treated as a single rank; ranks past the end own nothing.
pub fn slice_range(n: usize, parts: usize, rank: usize) -> Range<usize> {
    let parts = parts.max(1);
    if rank >= parts {
        return n..n;
    }
    let q = n / parts;
    let start = rank * q;
    let end = if rank + 1 == parts { n } else { start + q };
    start..end
}

/// Owning rank of every item.
pub fn owners(n: usize, parts: usize) -> Vec<usize> {
    let parts = parts.max(1);
    let mut owner = vec![0; n];
    for rank in 0..parts {
        owner[slice_range(n, parts, rank)].fill(rank);
    }
    owner
}

/// Number of items per rank.
pub fn counts(n: usize, parts: usize) -> Vec<usize> {
    (0..parts.max(1))
        .map(|rank| slice_range(n, parts, rank).len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fewer_items_than_ranks_go_to_last() {
        assert_eq!(slice_range(2, 4, 0), 0..0);
        assert_eq!(slice_range(2, 4, 2), 0..0);
        assert_eq!(slice_range(2, 4, 3), 0..2);
        assert_eq!(counts(2, 4), vec![0, 0, 0, 2]);
    }

    #[test]
    fn remainder_goes_to_last() {
        assert_eq!(counts(10, 3), vec![3, 3, 4]);
        assert_eq!(owners(5, 2), vec![0, 0, 1, 1, 1]);
        assert_eq!(slice_range(5, 1, 0), 0..5);
        assert_eq!(slice_range(5, 2, 7), 5..5);
    }

    proptest! {
        #[test]
        fn slices_tile_the_range(n in 0usize..500, parts in 1usize..17) {
            let q = n / parts;
            let mut next = 0;
            for rank in 0..parts {
                let r = slice_range(n, parts, rank);
                prop_assert_eq!(r.start, next);
                if rank + 1 < parts {
                    prop_assert_eq!(r.len(), q);
                } else {
                    prop_assert_eq!(r.len(), n - (parts - 1) * q);
                }
                next = r.end;
            }
            prop_assert_eq!(next, n);
        }
    }
}
