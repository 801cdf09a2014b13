//! In-place exchange sort used as the per-rank local sort.
//!
//! O(n²) on purpose: local arrays are bounded by the per-rank slice size and
//! the patterns only require correctness from the local step.

pub fn exchange_sort(values: &mut [i32]) {
    for _ in 0..values.len() {
        for i in 0..values.len().saturating_sub(1) {
            if values[i] > values[i + 1] {
                values.swap(i, i + 1);
            }
        }
    }
}
