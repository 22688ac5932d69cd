// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-flush recursion guard.

use alloc::collections::BTreeMap;

use super::job::Job;

/// Outcome of [`RecursionGuard::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// The job may run.
    Run,
    /// The job hit the limit. `first` is set only the first time, so the
    /// caller can warn once per job.
    Suppress { first: bool },
}

#[derive(Debug)]
struct Entry {
    // Keeps the job alive so its address cannot be reused during the flush.
    _job: Job,
    count: u32,
    reported: bool,
}

/// Counts executions per job over one flush (all passes, post-flush
/// callbacks included).
#[derive(Debug)]
pub(crate) struct RecursionGuard {
    limit: u32,
    seen: BTreeMap<usize, Entry>,
}

impl RecursionGuard {
    pub(crate) fn new(limit: u32) -> Self {
        Self {
            limit,
            seen: BTreeMap::new(),
        }
    }

    pub(crate) fn limit(&self) -> u32 {
        self.limit
    }

    /// Records an attempt to run `job`. A job may run at most `limit` times.
    pub(crate) fn check(&mut self, job: &Job) -> Verdict {
        let entry = self.seen.entry(job.addr()).or_insert_with(|| Entry {
            _job: job.clone(),
            count: 0,
            reported: false,
        });
        if entry.count >= self.limit {
            let first = !entry.reported;
            entry.reported = true;
            Verdict::Suppress { first }
        } else {
            entry.count += 1;
            Verdict::Run
        }
    }
}
