// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waiting for the next flush.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use super::Scheduler;

/// Future returned by [`Scheduler::next_tick`].
///
/// Resolves once the flush that was pending or running when it was created
/// has completed. Created while the scheduler is idle, it is ready at once.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct NextTick {
    scheduler: Scheduler,
    target: u64,
}

impl NextTick {
    pub(crate) fn new(scheduler: Scheduler, target: u64) -> Self {
        Self { scheduler, target }
    }

    /// Returns whether the awaited flush has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.scheduler.completed_flushes() >= self.target
    }
}

impl Future for NextTick {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.is_ready() {
            Poll::Ready(())
        } else {
            self.scheduler.register_waker(cx.waker());
            Poll::Pending
        }
    }
}
