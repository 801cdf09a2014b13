//! Decentralized phase-exchange sort.
//!
//! Every rank owns one contiguous slice of the global array for the whole
//! run; the slice never grows, shrinks, or migrates. Each round: sort the
//! slice, hand the slice maximum to the right neighbor, check local order
//! against the maximum received from the left, agree on global convergence
//! with an all-gather, and if not done run a bounded boundary exchange that
//! lets out-of-order elements migrate one slice per round.
//!
//! The convergence vector is rebuilt from scratch every round, so a stale
//! flag from an earlier round can never shortcut termination.

use log::debug;

use crate::error::{PatternError, Result};
use crate::parallel::{Comm, SourceRank, Tag};
use crate::sort::{even_ranges, exchange_sort, merge};

pub const TAG_MAX: Tag = 1;
pub const TAG_WINDOW: Tag = 2;
pub const TAG_RETURN: Tag = 3;
pub const TAG_SCATTER: Tag = 4;
pub const TAG_GATHER: Tag = 5;

/// Outcome of a run: rounds completed and whether every rank reported its
/// slice in order relative to its left neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseStats {
    pub rounds: usize,
    pub converged: bool,
}

pub struct PhaseSorter {
    /// Hard cap on rounds; the sorter stops here even if not converged.
    pub max_rounds: usize,
    /// Boundary window: how many elements may cross a slice boundary per
    /// round and direction.
    pub window: usize,
}

impl Default for PhaseSorter {
    fn default() -> Self {
        PhaseSorter { max_rounds: 10, window: 5 }
    }
}

impl PhaseSorter {
    /// Sorts this rank's owned slice in place, coordinating with neighbors
    /// until every rank converges or `max_rounds` is hit. All ranks leave in
    /// the same round.
    pub fn run_slice<C: Comm>(&self, comm: &C, slice: &mut [i32]) -> Result<PhaseStats> {
        let rank = comm.rank();
        let size = comm.size();
        let last = size - 1;

        for round in 1..=self.max_rounds {
            exchange_sort(slice);

            // An empty slice has no maximum of its own: it relays the left
            // neighbor's max so disorder cannot hide behind it. Receiving
            // before sending is deadlock-free here because the waits only
            // ever point left, and rank 0 never waits.
            let mut neighbor_max = if rank > 0 && slice.is_empty() {
                Some(comm.recv::<i32>(SourceRank::Rank(rank - 1), TAG_MAX)?)
            } else {
                None
            };
            if rank < last {
                let max = slice.last().copied().or(neighbor_max).unwrap_or(i32::MIN);
                comm.send(&max, rank + 1, TAG_MAX)?;
            }
            if rank > 0 && neighbor_max.is_none() {
                neighbor_max = Some(comm.recv::<i32>(SourceRank::Rank(rank - 1), TAG_MAX)?);
            }

            // Rank 0 is vacuously in order; an empty slice imposes nothing.
            let in_order = match (neighbor_max, slice.first()) {
                (Some(max), Some(&min)) => min >= max,
                _ => true,
            };

            let flags = comm.all_gather(in_order)?;
            if flags.iter().all(|&f| f) {
                debug!("rank {rank}: converged in round {round}");
                return Ok(PhaseStats { rounds: round, converged: true });
            }

            self.exchange_boundaries(comm, slice)?;
        }
        Ok(PhaseStats { rounds: self.max_rounds, converged: false })
    }

    /// One bounded correction pass across both slice boundaries. The right
    /// rank of each pair sends its lowest window left; the left rank merges
    /// that window with its own highest, keeps the smaller half and returns
    /// the larger half, which the right rank installs as its new low end.
    ///
    /// The window is clamped to half the slice so the low window (sent left)
    /// and the high window (merged right) never overlap; an overlap would
    /// let the same element travel both ways in one round and break
    /// conservation.
    fn exchange_boundaries<C: Comm>(&self, comm: &C, slice: &mut [i32]) -> Result<()> {
        let rank = comm.rank();
        let last = comm.size() - 1;
        let w_own = self.window.min(slice.len() / 2);

        if rank > 0 {
            comm.send(&slice[..w_own].to_vec(), rank - 1, TAG_WINDOW)?;
        }
        if rank < last {
            let incoming: Vec<i32> = comm.recv(SourceRank::Rank(rank + 1), TAG_WINDOW)?;
            let high = &slice[slice.len() - w_own..];
            // Both windows come out of freshly sorted slices, so the merge
            // precondition holds here; the sort after the merge guards the
            // keep half all the same.
            let mut combined = merge(high, &incoming);
            exchange_sort(&mut combined);
            let give_back = combined.split_off(w_own);
            let start = slice.len() - w_own;
            slice[start..].copy_from_slice(&combined);
            comm.send(&give_back, rank + 1, TAG_RETURN)?;
        }
        if rank > 0 {
            let returned: Vec<i32> = comm.recv(SourceRank::Rank(rank - 1), TAG_RETURN)?;
            if returned.len() != w_own {
                return Err(PatternError::Protocol(format!(
                    "neighbor returned {} boundary elements, expected {}",
                    returned.len(),
                    w_own
                )));
            }
            slice[..w_own].copy_from_slice(&returned);
        }
        Ok(())
    }

    /// Convenience entry for a root-held array: rank 0 scatters the slices
    /// (floor split, remainder to the last rank), every rank runs
    /// `run_slice`, and rank 0 gathers the slices back in rank order.
    pub fn sort<C: Comm>(&self, comm: &C, input: Option<Vec<i32>>) -> Result<Option<Vec<i32>>> {
        let rank = comm.rank();
        let size = comm.size();

        let total = if rank == 0 {
            let len = input
                .as_ref()
                .ok_or_else(|| PatternError::Config("rank 0 must supply the input array".into()))?
                .len();
            comm.broadcast(len, 0)?
        } else {
            comm.broadcast(0, 0)?
        };
        let ranges = even_ranges(total, size);

        let mut slice = if rank == 0 {
            let array = input.unwrap_or_default();
            for (dest, range) in ranges.iter().enumerate().skip(1) {
                comm.send(&array[range.clone()].to_vec(), dest, TAG_SCATTER)?;
            }
            array[ranges[0].clone()].to_vec()
        } else {
            comm.recv::<Vec<i32>>(SourceRank::Rank(0), TAG_SCATTER)?
        };

        self.run_slice(comm, &mut slice)?;

        if rank == 0 {
            let mut out = slice;
            out.reserve(total - out.len());
            for (src, range) in ranges.iter().enumerate().skip(1) {
                let part: Vec<i32> = comm.recv(SourceRank::Rank(src), TAG_GATHER)?;
                if part.len() != range.len() {
                    return Err(PatternError::Protocol(format!(
                        "rank {src} returned {} elements for a {} element slice",
                        part.len(),
                        range.len()
                    )));
                }
                out.extend_from_slice(&part);
            }
            Ok(Some(out))
        } else {
            comm.send(&slice, 0, TAG_GATHER)?;
            Ok(None)
        }
    }
}
