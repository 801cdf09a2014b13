//! Two-pointer merge of sorted sequences.

/// Merges two ascending sequences into one ascending sequence.
///
/// Precondition: both inputs are already sorted ascending. The phase-exchange
/// sort also feeds this unsorted window pairs and re-sorts the output, so the
/// result is only guaranteed sorted when the precondition holds.
pub fn merge(a: &[i32], b: &[i32]) -> Vec<i32> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaves_two_sorted_runs() {
        assert_eq!(merge(&[1, 9], &[3, 5]), vec![1, 3, 5, 9]);
    }

    #[test]
    fn merge_of_empties_is_empty() {
        assert_eq!(merge(&[], &[]), Vec::<i32>::new());
    }

    #[test]
    fn merging_with_empty_is_identity() {
        let m = merge(&[1, 3, 5, 9], &[2, 4]);
        assert_eq!(merge(&m, &[]), m);
        assert_eq!(merge(&[], &m), m);
    }

    #[test]
    fn stable_on_duplicates() {
        assert_eq!(merge(&[2, 2, 4], &[2, 3]), vec![2, 2, 2, 3, 4]);
    }
}
