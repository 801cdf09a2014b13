//! Farm pipeline: one source rank, a pool of worker ranks, one sink rank.
//!
//! The source round-robins work envelopes over the worker ranks and closes
//! the stream with one end-of-stream envelope per worker; each worker
//! forwards its own EOS to the sink, and the sink terminates once it has
//! counted an EOS from every worker. The sink polls workers in the same
//! round-robin order the source assigns in, so its selective receives line up
//! with each worker's send sequence and the empty-input case cannot hang.

use std::path::Path;

use log::{debug, info};

use crate::error::{PatternError, Result};
use crate::message::{Classification, Envelope, ResultRecord, WorkItem};
use crate::parallel::{Comm, SourceRank, Tag};
use crate::storage::results::ResultLog;

pub const TAG_WORK: Tag = 1;
pub const TAG_RESULT: Tag = 2;

/// Classification collaborator. Pure; failures are fatal for the owning rank.
pub trait Classifier {
    fn classify(&self, bytes: &[u8]) -> Result<Classification>;
}

/// Pipeline role, fixed by `(rank, size)` at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Source,
    Worker,
    Sink,
}

impl Role {
    pub fn of(rank: usize, size: usize) -> Role {
        if rank == 0 {
            Role::Source
        } else if rank == size - 1 {
            Role::Sink
        } else {
            Role::Worker
        }
    }
}

/// What one rank did: its role and how many items it handled (sent,
/// classified, or logged respectively).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineSummary {
    pub role: Role,
    pub items: usize,
}

pub struct PipelineCoordinator<'a, C: Comm> {
    comm: &'a C,
}

impl<'a, C: Comm> PipelineCoordinator<'a, C> {
    /// Needs at least source + one worker + sink.
    pub fn new(comm: &'a C) -> Result<Self> {
        if comm.size() < 3 {
            return Err(PatternError::Config(format!(
                "pipeline needs at least 3 ranks (source, worker, sink), got {}",
                comm.size()
            )));
        }
        Ok(PipelineCoordinator { comm })
    }

    fn num_workers(&self) -> usize {
        self.comm.size() - 2
    }

    fn sink_rank(&self) -> usize {
        self.comm.size() - 1
    }

    /// Runs this rank's role to completion. `items` is consumed on the source
    /// rank only, `classifier` on workers only, `log_path` on the sink only.
    pub fn run<I, F>(&self, items: I, classifier: &F, log_path: &Path) -> Result<PipelineSummary>
    where
        I: IntoIterator<Item = WorkItem>,
        F: Classifier,
    {
        let role = Role::of(self.comm.rank(), self.comm.size());
        let items = match role {
            Role::Source => self.run_source(items)?,
            Role::Worker => self.run_worker(classifier)?,
            Role::Sink => self.run_sink(log_path)?,
        };
        Ok(PipelineSummary { role, items })
    }

    /// Source: emit one envelope per item, round-robin over worker ranks,
    /// then one EOS per worker. Fire-and-forget; never waits for replies.
    pub fn run_source<I>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = WorkItem>,
    {
        let mut worker = 1;
        let mut sent = 0;
        for item in items {
            let env = Envelope::item(item.source_id.clone(), item);
            self.comm.send(&env, worker, TAG_WORK)?;
            sent += 1;
            worker += 1;
            if worker == self.sink_rank() {
                worker = 1;
            }
        }
        for worker in 1..self.sink_rank() {
            self.comm.send(&Envelope::<WorkItem>::end_of_stream(), worker, TAG_WORK)?;
        }
        info!("source: {} items sent to {} workers", sent, self.num_workers());
        Ok(sent)
    }

    /// Worker: classify items strictly in receipt order, one result send per
    /// item, one terminal EOS forwarded to the sink.
    pub fn run_worker<F: Classifier>(&self, classifier: &F) -> Result<usize> {
        let mut processed = 0;
        loop {
            let env: Envelope<WorkItem> = self.comm.recv(SourceRank::Rank(0), TAG_WORK)?;
            if env.eos {
                self.comm
                    .send(&Envelope::<ResultRecord>::end_of_stream(), self.sink_rank(), TAG_RESULT)?;
                break;
            }
            let item = env.payload.ok_or_else(|| {
                PatternError::Protocol("work envelope without payload".into())
            })?;
            let classification = classifier.classify(&item.bytes)?;
            debug!(
                "worker {}: {} -> {} ({:.3})",
                self.comm.rank(),
                item.source_id,
                classification.label,
                classification.confidence
            );
            let record = ResultRecord::new(&item.source_id, &classification)?;
            let env = Envelope::item(record.source_id.clone(), record);
            self.comm.send(&env, self.sink_rank(), TAG_RESULT)?;
            processed += 1;
        }
        Ok(processed)
    }

    /// Sink: truncate the log, append results in receipt order, stop after
    /// one EOS per worker.
    pub fn run_sink(&self, log_path: &Path) -> Result<usize> {
        let mut log = ResultLog::create(log_path)?;
        let mut eos_count = 0;
        let mut written = 0;
        let mut worker = 1;
        while eos_count < self.num_workers() {
            let env: Envelope<ResultRecord> =
                self.comm.recv(SourceRank::Rank(worker), TAG_RESULT)?;
            worker += 1;
            if worker == self.sink_rank() {
                worker = 1;
            }
            if env.eos {
                eos_count += 1;
                continue;
            }
            let record = env.payload.ok_or_else(|| {
                PatternError::Protocol("result envelope without payload".into())
            })?;
            log.append(&record.line)?;
            written += 1;
        }
        log.flush()?;
        info!("sink: {} results logged, {} EOS consumed", written, eos_count);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_rank_boundaries() {
        assert_eq!(Role::of(0, 4), Role::Source);
        assert_eq!(Role::of(1, 4), Role::Worker);
        assert_eq!(Role::of(2, 4), Role::Worker);
        assert_eq!(Role::of(3, 4), Role::Sink);
    }

    #[test]
    fn two_ranks_is_a_config_error() {
        let err = crate::parallel::LocalUniverse::new(2)
            .run(|comm| match PipelineCoordinator::new(&comm) {
                Err(PatternError::Config(msg)) => Ok(msg),
                _ => Err(PatternError::Protocol("expected config error".into())),
            })
            .unwrap();
        assert!(err[0].contains("at least 3 ranks"));
    }
}
