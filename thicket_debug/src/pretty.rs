// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use thicket_core::host::NodeId;
use thicket_core::trace::{
    FlushBeginEvent, FlushSummary, NodeMountedEvent, NodeMovedEvent, NodeRemovedEvent, TraceSink,
    Warning,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Formats an optional node as `-` when absent.
struct Opt(Option<NodeId>);

impl std::fmt::Display for Opt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id:?}"),
            None => f.write_str("-"),
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_warning(&mut self, w: &Warning) {
        let _ = writeln!(self.writer, "[warn] {w}");
    }

    fn on_node_mounted(&mut self, e: &NodeMountedEvent) {
        let _ = writeln!(
            self.writer,
            "[mount] node={:?} parent={}",
            e.node,
            Opt(e.parent),
        );
    }

    fn on_node_moved(&mut self, e: &NodeMovedEvent) {
        let _ = writeln!(
            self.writer,
            "[move] node={:?} parent={:?} before={}",
            e.node,
            e.parent,
            Opt(e.anchor),
        );
    }

    fn on_node_removed(&mut self, e: &NodeRemovedEvent) {
        let _ = writeln!(
            self.writer,
            "[remove] node={:?} parent={}",
            e.node,
            Opt(e.parent),
        );
    }

    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[flush:begin] flush={} queued={}",
            e.flush_index, e.queued,
        );
    }

    fn on_flush_end(&mut self, s: &FlushSummary) {
        let _ = writeln!(
            self.writer,
            "[flush:end] flush={} passes={} run={} failed={} skipped={} \
             suppressed={} post={}",
            s.flush_index,
            s.passes,
            s.jobs_run,
            s.jobs_failed,
            s.jobs_skipped,
            s.jobs_suppressed,
            s.post_flush_run,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_mount_and_warning() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_node_mounted(&NodeMountedEvent {
            node: NodeId::new(3, 1),
            parent: None,
        });
        sink.on_warning(&Warning::MissingRootNode);
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[mount] node=NodeId(3@gen1) parent=-"), "got: {output}");
        assert!(output.contains("[warn] please provide a root node"), "got: {output}");
    }

    #[test]
    fn pretty_print_flush_summary() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_flush_end(&FlushSummary {
            flush_index: 4,
            passes: 2,
            jobs_run: 7,
            ..FlushSummary::default()
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[flush:end] flush=4 passes=2 run=7"), "got: {output}");
    }
}
