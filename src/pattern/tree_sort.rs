//! Divide-and-conquer merge sort mapped onto the rank space.
//!
//! Rank identity encodes tree position: rank `r`'s children are `2r+1` and
//! `2r+2` (binary heap indexing). The root splits once and sends the halves
//! to ranks 1 and 2; every other rank either recurses the same way or, at a
//! leaf, sorts locally and replies to its parent. Each half arrives at its
//! parent already sorted, so the parent merge is a plain two-pointer merge
//! and the whole protocol is a bottom-up merge sort shaped by the topology.
//!
//! Rank counts that do not form a complete tree leave some ranks outside the
//! recursion; the root computes the reachable set up front and sends those
//! ranks an idle message so every rank receives exactly one task and
//! terminates.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PatternError, Result};
use crate::parallel::{Comm, SourceRank, Tag};
use crate::sort::{exchange_sort, merge, split};

pub const TAG_TASK: Tag = 1;
pub const TAG_DONE: Tag = 2;

#[derive(Serialize, Deserialize)]
enum TreeTask {
    Sort { data: Vec<i32>, delta: usize, parent: usize },
    Idle,
}

/// Leaf predicate shared by the recursion and the root's reachability
/// simulation: small enough to sort locally, or a child index out of range.
fn is_leaf(rank: usize, len: usize, delta: usize, size: usize) -> bool {
    len <= delta || 2 * rank + 1 >= size || 2 * rank + 2 >= size
}

/// Ranks the recursion will reach, given the root's initial split.
fn reachable(size: usize, delta: usize, left_len: usize, right_len: usize) -> Vec<bool> {
    let mut seen = vec![false; size];
    seen[0] = true;
    let mut stack = vec![(1, left_len), (2, right_len)];
    while let Some((rank, len)) = stack.pop() {
        seen[rank] = true;
        if !is_leaf(rank, len, delta, size) {
            stack.push((2 * rank + 1, len / 2));
            stack.push((2 * rank + 2, len - len / 2));
        }
    }
    seen
}

pub struct TreeSorter;

impl TreeSorter {
    /// Runs this rank's part of the sort. Rank 0 supplies the input and gets
    /// the sorted output back; every other rank passes `None` and returns
    /// `None` after serving its tree node.
    pub fn run<C: Comm>(comm: &C, input: Option<Vec<i32>>) -> Result<Option<Vec<i32>>> {
        if comm.size() < 3 {
            return Err(PatternError::Config(format!(
                "tree sort needs at least 3 ranks, got {}",
                comm.size()
            )));
        }
        if comm.rank() == 0 {
            let array = input.ok_or_else(|| {
                PatternError::Config("rank 0 must supply the input array".into())
            })?;
            Self::run_root(comm, array).map(Some)
        } else {
            Self::run_node(comm)?;
            Ok(None)
        }
    }

    fn run_root<C: Comm>(comm: &C, array: Vec<i32>) -> Result<Vec<i32>> {
        let delta = array.len().div_ceil(comm.size() - 1);
        let (left, right) = split(&array);
        debug!(
            "root: {} elements, delta {}, halves {}/{}",
            array.len(),
            delta,
            left.len(),
            right.len()
        );

        // Ranks the recursion will never task still block on their one
        // receive; release them before doing anything else.
        let seen = reachable(comm.size(), delta, left.len(), right.len());
        for (rank, &tasked) in seen.iter().enumerate() {
            if !tasked {
                comm.send(&TreeTask::Idle, rank, TAG_TASK)?;
            }
        }

        let (left_len, right_len) = (left.len(), right.len());
        comm.send(&TreeTask::Sort { data: left, delta, parent: 0 }, 1, TAG_TASK)?;
        comm.send(&TreeTask::Sort { data: right, delta, parent: 0 }, 2, TAG_TASK)?;

        let sorted_left: Vec<i32> = comm.recv(SourceRank::Rank(1), TAG_DONE)?;
        let sorted_right: Vec<i32> = comm.recv(SourceRank::Rank(2), TAG_DONE)?;
        check_len(&sorted_left, left_len)?;
        check_len(&sorted_right, right_len)?;
        Ok(merge(&sorted_left, &sorted_right))
    }

    fn run_node<C: Comm>(comm: &C) -> Result<()> {
        let task: TreeTask = comm.recv(SourceRank::Any, TAG_TASK)?;
        let TreeTask::Sort { mut data, delta, parent } = task else {
            return Ok(());
        };
        let rank = comm.rank();
        if is_leaf(rank, data.len(), delta, comm.size()) {
            exchange_sort(&mut data);
            return comm.send(&data, parent, TAG_DONE);
        }

        let (left_child, right_child) = (2 * rank + 1, 2 * rank + 2);
        let (left, right) = split(&data);
        let (left_len, right_len) = (left.len(), right.len());
        debug!("rank {rank}: forwarding {left_len}/{right_len} to {left_child}/{right_child}");
        comm.send(&TreeTask::Sort { data: left, delta, parent: rank }, left_child, TAG_TASK)?;
        comm.send(&TreeTask::Sort { data: right, delta, parent: rank }, right_child, TAG_TASK)?;

        let sorted_left: Vec<i32> = comm.recv(SourceRank::Rank(left_child), TAG_DONE)?;
        let sorted_right: Vec<i32> = comm.recv(SourceRank::Rank(right_child), TAG_DONE)?;
        check_len(&sorted_left, left_len)?;
        check_len(&sorted_right, right_len)?;
        comm.send(&merge(&sorted_left, &sorted_right), parent, TAG_DONE)
    }
}

fn check_len(got: &[i32], sent: usize) -> Result<()> {
    if got.len() != sent {
        return Err(PatternError::Protocol(format!(
            "child returned {} elements for a {} element subrange",
            got.len(),
            sent
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_predicate_covers_small_arrays_and_missing_children() {
        // delta bound
        assert!(is_leaf(1, 2, 2, 7));
        assert!(!is_leaf(1, 3, 2, 8));
        // child index out of range
        assert!(is_leaf(2, 10, 1, 6));
        assert!(!is_leaf(2, 10, 1, 7));
    }

    #[test]
    fn reachability_marks_untasked_ranks() {
        // size 6, big delta: ranks 1 and 2 are leaves, 3..5 never tasked.
        let seen = reachable(6, 10, 10, 10);
        assert_eq!(seen, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn reachability_descends_past_non_leaves() {
        // size 7, small delta: both halves recurse one level.
        let seen = reachable(7, 2, 4, 4);
        assert!(seen.iter().all(|&s| s));
    }
}
