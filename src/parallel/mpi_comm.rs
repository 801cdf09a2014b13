//! MPI-based communication backend.
//!
//! Implements the `Comm` trait over the MPI world communicator for
//! distributed-memory runs under `mpiexec`. Values are bincode-encoded and
//! travel as byte buffers; variable-length collectives first agree on lengths
//! with a fixed-size exchange. Only available with the `mpi` feature.

use mpi::datatype::PartitionMut;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use super::{Comm, SourceRank, Tag};
use crate::error::{PatternError, Result};

/// MPI world communicator wrapper.
pub struct MpiComm {
    pub world: SimpleCommunicator,
    pub rank: usize,
    pub size: usize,
}

impl MpiComm {
    /// Initializes MPI and binds to the world communicator.
    pub fn new() -> Result<Self> {
        let universe = mpi::initialize()
            .ok_or_else(|| PatternError::Transport("MPI already initialized".into()))?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        // Leak the universe so MPI stays alive for the process lifetime.
        std::mem::forget(universe);
        Ok(MpiComm { world, rank, size })
    }
}

impl Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send<T: serde::Serialize>(&self, value: &T, dest: usize, tag: Tag) -> Result<()> {
        let bytes = bincode::serialize(value)?;
        self.world
            .process_at_rank(dest as i32)
            .send_with_tag(&bytes[..], tag as i32);
        Ok(())
    }

    fn recv<T: serde::de::DeserializeOwned>(&self, source: SourceRank, tag: Tag) -> Result<T> {
        let (bytes, _status) = match source {
            SourceRank::Rank(r) => self
                .world
                .process_at_rank(r as i32)
                .receive_vec_with_tag::<u8>(tag as i32),
            SourceRank::Any => self.world.any_process().receive_vec_with_tag::<u8>(tag as i32),
        };
        Ok(bincode::deserialize(&bytes)?)
    }

    fn broadcast<T: serde::Serialize + serde::de::DeserializeOwned>(
        &self,
        value: T,
        root: usize,
    ) -> Result<T> {
        let root_proc = self.world.process_at_rank(root as i32);
        let mut len = if self.rank == root {
            bincode::serialized_size(&value)? as u64
        } else {
            0
        };
        root_proc.broadcast_into(&mut len);
        let mut bytes = if self.rank == root {
            bincode::serialize(&value)?
        } else {
            vec![0u8; len as usize]
        };
        root_proc.broadcast_into(&mut bytes[..]);
        if self.rank == root {
            Ok(value)
        } else {
            Ok(bincode::deserialize(&bytes)?)
        }
    }

    /// Native all-gather: one fixed-size length exchange plus one
    /// variable-count gather, instead of `size` sequential broadcasts.
    fn all_gather<T: serde::Serialize + serde::de::DeserializeOwned + Clone>(
        &self,
        value: T,
    ) -> Result<Vec<T>> {
        let bytes = bincode::serialize(&value)?;
        let local_len = bytes.len() as i32;
        let mut lens = vec![0i32; self.size];
        self.world.all_gather_into(&local_len, &mut lens[..]);

        let displs: Vec<i32> = lens
            .iter()
            .scan(0, |acc, &n| {
                let d = *acc;
                *acc += n;
                Some(d)
            })
            .collect();
        let total: i32 = lens.iter().sum();
        let mut recv = vec![0u8; total as usize];
        {
            let mut partition = PartitionMut::new(&mut recv[..], &lens[..], &displs[..]);
            self.world.all_gather_varcount_into(&bytes[..], &mut partition);
        }

        let mut out = Vec::with_capacity(self.size);
        for (len, disp) in lens.iter().zip(&displs) {
            let start = *disp as usize;
            let end = start + *len as usize;
            out.push(bincode::deserialize(&recv[start..end])?);
        }
        Ok(out)
    }
}
