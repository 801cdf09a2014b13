//! In-process communication backend: one thread per rank, channel mailboxes.
//!
//! Each rank owns a single inbox carrying `(source, tag, bytes)` packets from
//! every peer. Selective receive (specific source and tag) stashes packets
//! that do not match and replays the stash, in arrival order, on later calls,
//! which preserves FIFO delivery per (source, destination, tag) triple.
//!
//! `LocalUniverse` is both the default runtime backend and the test harness:
//! it spawns one scoped thread per rank and collects the per-rank results.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use serde::{Serialize, de::DeserializeOwned};

use super::{BCAST_TAG, Comm, SourceRank, Tag};
use crate::error::{PatternError, Result};

struct Packet {
    src: usize,
    tag: Tag,
    bytes: Vec<u8>,
}

/// One rank's endpoint. Owned by exactly one thread; not `Sync`.
pub struct LocalComm {
    rank: usize,
    size: usize,
    peers: Vec<Sender<Packet>>,
    inbox: Receiver<Packet>,
    stash: RefCell<VecDeque<Packet>>,
}

impl LocalComm {
    fn matches(p: &Packet, source: SourceRank, tag: Tag) -> bool {
        p.tag == tag
            && match source {
                SourceRank::Rank(r) => p.src == r,
                SourceRank::Any => true,
            }
    }

    fn next_packet(&self, source: SourceRank, tag: Tag) -> Result<Packet> {
        let mut stash = self.stash.borrow_mut();
        if let Some(pos) = stash.iter().position(|p| Self::matches(p, source, tag))
            && let Some(p) = stash.remove(pos)
        {
            return Ok(p);
        }
        loop {
            let p = self
                .inbox
                .recv()
                .map_err(|_| PatternError::Transport("all peer endpoints dropped".into()))?;
            if Self::matches(&p, source, tag) {
                return Ok(p);
            }
            stash.push_back(p);
        }
    }
}

impl Comm for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send<T: Serialize>(&self, value: &T, dest: usize, tag: Tag) -> Result<()> {
        let peer = self.peers.get(dest).ok_or_else(|| {
            PatternError::Protocol(format!("send to rank {dest} outside 0..{}", self.size))
        })?;
        let bytes = bincode::serialize(value)?;
        peer.send(Packet { src: self.rank, tag, bytes })
            .map_err(|_| PatternError::Transport(format!("rank {dest} already terminated")))
    }

    fn recv<T: DeserializeOwned>(&self, source: SourceRank, tag: Tag) -> Result<T> {
        let p = self.next_packet(source, tag)?;
        Ok(bincode::deserialize(&p.bytes)?)
    }

    fn broadcast<T: Serialize + DeserializeOwned>(&self, value: T, root: usize) -> Result<T> {
        if self.rank == root {
            for dest in 0..self.size {
                if dest != root {
                    self.send(&value, dest, BCAST_TAG)?;
                }
            }
            Ok(value)
        } else {
            self.recv(SourceRank::Rank(root), BCAST_TAG)
        }
    }
}

/// Spawns `size` rank threads wired together with channel mailboxes.
pub struct LocalUniverse {
    size: usize,
}

impl LocalUniverse {
    pub fn new(size: usize) -> Self {
        LocalUniverse { size }
    }

    /// Runs `f` once per rank on its own thread and returns the per-rank
    /// results in rank order. The first rank error (or panic) wins.
    pub fn run<T, F>(&self, f: F) -> Result<Vec<T>>
    where
        F: Fn(LocalComm) -> Result<T> + Send + Sync,
        T: Send,
    {
        if self.size == 0 {
            return Err(PatternError::Config("rank count must be at least 1".into()));
        }

        let mut senders = Vec::with_capacity(self.size);
        let mut inboxes = Vec::with_capacity(self.size);
        for _ in 0..self.size {
            let (tx, rx) = mpsc::channel();
            senders.push(tx);
            inboxes.push(rx);
        }
        let comms: Vec<LocalComm> = inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalComm {
                rank,
                size: self.size,
                peers: senders.clone(),
                inbox,
                stash: RefCell::new(VecDeque::new()),
            })
            .collect();
        drop(senders);

        thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| {
                    let f = &f;
                    scope.spawn(move || f(comm))
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, h)| {
                    h.join()
                        .map_err(|_| PatternError::Transport(format!("rank {rank} panicked")))?
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_per_source_and_tag() {
        let out = LocalUniverse::new(2)
            .run(|comm| {
                if comm.rank() == 0 {
                    for i in 0..4u32 {
                        comm.send(&i, 1, 7)?;
                    }
                    Ok(vec![])
                } else {
                    let mut got = Vec::new();
                    for _ in 0..4 {
                        got.push(comm.recv::<u32>(SourceRank::Rank(0), 7)?);
                    }
                    Ok(got)
                }
            })
            .unwrap();
        assert_eq!(out[1], vec![0, 1, 2, 3]);
    }

    #[test]
    fn selective_receive_stashes_other_tags() {
        let out = LocalUniverse::new(2)
            .run(|comm| {
                if comm.rank() == 0 {
                    comm.send(&"low", 1, 1)?;
                    comm.send(&"high", 1, 2)?;
                    Ok(String::new())
                } else {
                    // Receive the later tag first; the earlier packet must
                    // still be delivered afterwards.
                    let high: String = comm.recv(SourceRank::Rank(0), 2)?;
                    let low: String = comm.recv(SourceRank::Rank(0), 1)?;
                    Ok(format!("{high}/{low}"))
                }
            })
            .unwrap();
        assert_eq!(out[1], "high/low");
    }

    #[test]
    fn any_source_matches_either_peer() {
        let out = LocalUniverse::new(3)
            .run(|comm| {
                if comm.rank() < 2 {
                    comm.send(&comm.rank(), 2, 0)?;
                    Ok(0)
                } else {
                    let a: usize = comm.recv(SourceRank::Any, 0)?;
                    let b: usize = comm.recv(SourceRank::Any, 0)?;
                    Ok(a + b)
                }
            })
            .unwrap();
        assert_eq!(out[2], 1);
    }

    #[test]
    fn broadcast_delivers_root_value_everywhere() {
        let out = LocalUniverse::new(4)
            .run(|comm| comm.broadcast(comm.rank() * 10, 2))
            .unwrap();
        assert_eq!(out, vec![20, 20, 20, 20]);
    }

    #[test]
    fn all_gather_builds_rank_indexed_vector() {
        let out = LocalUniverse::new(3)
            .run(|comm| comm.all_gather(comm.rank() as i32 - 1))
            .unwrap();
        for v in out {
            assert_eq!(v, vec![-1, 0, 1]);
        }
    }
}
