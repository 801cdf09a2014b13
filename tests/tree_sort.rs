//! Tree sort tests over the in-process backend.

use mpi_patterns::parallel::{Comm, LocalUniverse};
use mpi_patterns::pattern::TreeSorter;
use rand::Rng;

fn tree_sort(size: usize, input: Vec<i32>) -> Vec<i32> {
    let results = LocalUniverse::new(size)
        .run(|comm| {
            let input = (comm.rank() == 0).then(|| input.clone());
            TreeSorter::run(&comm, input)
        })
        .unwrap();
    let mut out = None;
    for (rank, r) in results.into_iter().enumerate() {
        if rank == 0 {
            out = r;
        } else {
            assert!(r.is_none(), "rank {rank} returned data");
        }
    }
    out.expect("root must produce the sorted array")
}

#[test]
fn three_ranks_with_two_leaves() {
    // delta = ceil(4/2) = 2, so ranks 1 and 2 are leaves:
    // [9,1] -> [1,9], [5,3] -> [3,5], root merges to [1,3,5,9].
    assert_eq!(tree_sort(3, vec![9, 1, 5, 3]), vec![1, 3, 5, 9]);
}

#[test]
fn matches_canonical_sort_on_random_input() {
    let mut rng = rand::thread_rng();
    for &size in &[3, 7, 15] {
        let input: Vec<i32> = (0..40).map(|_| rng.gen_range(-100..100)).collect();
        let mut expected = input.clone();
        expected.sort();
        assert_eq!(tree_sort(size, input), expected, "rank count {size}");
    }
}

#[test]
fn sorted_input_is_returned_unchanged() {
    let input: Vec<i32> = (0..30).collect();
    assert_eq!(tree_sort(7, input.clone()), input);
}

#[test]
fn incomplete_tree_releases_untasked_ranks() {
    // size 6: rank 2's right child would be rank 6, so rank 2 is a leaf and
    // rank 5 is never tasked. The run must still terminate on every rank.
    let input = vec![8, 6, 7, 5, 3, 0, 9, 1];
    let mut expected = input.clone();
    expected.sort();
    assert_eq!(tree_sort(6, input), expected);
}

#[test]
fn duplicates_and_empty_input_are_handled() {
    assert_eq!(tree_sort(3, vec![2, 2, 1, 2]), vec![1, 2, 2, 2]);
    assert_eq!(tree_sort(3, vec![]), Vec::<i32>::new());
}
