// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bridge to the [`log`] facade.
//!
//! [`LogSink`] sends warnings to `log::warn!` and every other event to
//! `log::trace!`, all under the `thicket` target, so applications that
//! already configure a logger see thicket diagnostics without further setup.

use thicket_core::trace::{
    FlushBeginEvent, FlushSummary, NodeMountedEvent, NodeMovedEvent, NodeRemovedEvent, TraceSink,
    Warning,
};

const TARGET: &str = "thicket";

/// A [`TraceSink`] that forwards to the `log` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn on_warning(&mut self, w: &Warning) {
        log::warn!(target: TARGET, "{w}");
    }

    fn on_node_mounted(&mut self, e: &NodeMountedEvent) {
        log::trace!(target: TARGET, "mount node={:?} parent={:?}", e.node, e.parent);
    }

    fn on_node_moved(&mut self, e: &NodeMovedEvent) {
        log::trace!(
            target: TARGET,
            "move node={:?} parent={:?} anchor={:?}",
            e.node,
            e.parent,
            e.anchor
        );
    }

    fn on_node_removed(&mut self, e: &NodeRemovedEvent) {
        log::trace!(target: TARGET, "remove node={:?} parent={:?}", e.node, e.parent);
    }

    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        log::trace!(
            target: TARGET,
            "flush {} begin, {} queued",
            e.flush_index,
            e.queued
        );
    }

    fn on_flush_end(&mut self, s: &FlushSummary) {
        log::trace!(
            target: TARGET,
            "flush {} end: {} passes, {} run, {} failed, {} suppressed",
            s.flush_index,
            s.passes,
            s.jobs_run,
            s.jobs_failed,
            s.jobs_suppressed
        );
    }
}
