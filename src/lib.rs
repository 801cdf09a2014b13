//! mpi-patterns: parallel coordination patterns over rank-addressed messaging
//!
//! This crate implements three classic coordination patterns on top of a small
//! message-passing substrate: a source/workers/sink farm pipeline, a
//! divide-and-conquer merge sort whose recursion tree is mapped onto the rank
//! space, and a fully decentralized phase-exchange sort with a distributed
//! convergence round. Backends: an in-process threaded communicator (default,
//! also the test harness) and MPI behind the `mpi` feature.

pub mod parallel;

pub mod config;
pub mod error;
pub mod message;
pub mod pattern;
pub mod sort;
pub mod storage;

// Re-exports for convenience
pub use config::*;
pub use error::*;
pub use message::*;
pub use pattern::*;

// Re-export the substrate seam at the crate root for convenience
pub use parallel::{Comm, SourceRank, Tag};
