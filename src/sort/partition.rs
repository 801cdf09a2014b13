//! Contiguous array partitioning.

use std::ops::Range;

/// Splits into two contiguous halves: floor(len/2) on the left, the rest on
/// the right. Deterministic given the length.
pub fn split(values: &[i32]) -> (Vec<i32>, Vec<i32>) {
    let mid = values.len() / 2;
    (values[..mid].to_vec(), values[mid..].to_vec())
}

/// Per-rank slice ranges for an array of `total` elements over `parts` owners:
/// floor(total/parts) each, with the remainder assigned to the last rank.
pub fn even_ranges(total: usize, parts: usize) -> Vec<Range<usize>> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    (0..parts)
        .map(|r| {
            let start = r * base;
            let end = if r == parts - 1 { total } else { start + base };
            start..end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_floor_ceil() {
        let (l, r) = split(&[9, 1, 5, 3, 7]);
        assert_eq!(l, vec![9, 1]);
        assert_eq!(r, vec![5, 3, 7]);
    }

    #[test]
    fn split_empty_and_single() {
        let (l, r) = split(&[]);
        assert!(l.is_empty() && r.is_empty());
        let (l, r) = split(&[4]);
        assert!(l.is_empty());
        assert_eq!(r, vec![4]);
    }

    #[test]
    fn even_ranges_cover_everything_once() {
        let ranges = even_ranges(23, 4);
        assert_eq!(ranges, vec![0..5, 5..10, 10..15, 15..23]);
        let ranges = even_ranges(20, 4);
        assert_eq!(ranges, vec![0..5, 5..10, 10..15, 15..20]);
    }

    #[test]
    fn even_ranges_remainder_goes_to_last_rank() {
        let ranges = even_ranges(10, 3);
        assert_eq!(ranges.last().cloned(), Some(6..10));
    }
}
