use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

/// Message tag. Each coordination pattern reserves its own small tag space;
/// `BCAST_TAG` is claimed by the collectives and must not be used for
/// point-to-point traffic.
pub type Tag = u16;

/// Tag reserved for broadcast/all-gather traffic.
pub const BCAST_TAG: Tag = Tag::MAX;

/// Receive matcher: a specific peer rank, or whichever peer sends first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRank {
    Rank(usize),
    Any,
}

/// Rank-addressed messaging substrate consumed by every coordination pattern.
///
/// Values cross the wire as bincode; ordering between a fixed
/// (source, destination, tag) triple is FIFO. `send` never blocks the caller,
/// `recv` and `broadcast` block until the matching message or round arrives.
/// There are no timeouts: a receive with no matching send blocks forever.
pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn send<T: Serialize>(&self, value: &T, dest: usize, tag: Tag) -> Result<()>;

    fn recv<T: DeserializeOwned>(&self, source: SourceRank, tag: Tag) -> Result<T>;

    /// Root's value is delivered to every rank. All ranks must call
    /// collectives in the same order.
    fn broadcast<T: Serialize + DeserializeOwned>(&self, value: T, root: usize) -> Result<T>;

    /// Every rank contributes one value; all ranks receive the full vector
    /// indexed by rank. Default: `size` sequential broadcasts, one per root.
    /// Backends with a native all-gather collective override this.
    fn all_gather<T: Serialize + DeserializeOwned + Clone>(&self, value: T) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(self.size());
        for root in 0..self.size() {
            out.push(self.broadcast(value.clone(), root)?);
        }
        Ok(out)
    }
}

pub mod local_comm;
pub use local_comm::{LocalComm, LocalUniverse};

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;
