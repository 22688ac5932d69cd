// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it receives
//! as a [`RecordedEvent`], in arrival order. Share it through an
//! `Rc<RefCell<_>>` to inspect the recording while it is installed.

use thicket_core::trace::{
    FlushBeginEvent, FlushSummary, NodeMountedEvent, NodeMovedEvent, NodeRemovedEvent, TraceSink,
    Warning,
};

/// One recorded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`Warning`].
    Warning(Warning),
    /// A node was mounted.
    NodeMounted(NodeMountedEvent),
    /// A node was moved.
    NodeMoved(NodeMovedEvent),
    /// A node was removed.
    NodeRemoved(NodeRemovedEvent),
    /// A flush started.
    FlushBegin(FlushBeginEvent),
    /// A flush ended.
    FlushEnd(FlushSummary),
}

impl RecordedEvent {
    /// Returns a short, stable name for the event kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Warning(_) => "warning",
            Self::NodeMounted(_) => "node_mounted",
            Self::NodeMoved(_) => "node_moved",
            Self::NodeRemoved(_) => "node_removed",
            Self::FlushBegin(_) => "flush_begin",
            Self::FlushEnd(_) => "flush_end",
        }
    }
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that keeps events in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Drops everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the recorded warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::Warning(w) => Some(w),
            _ => None,
        })
    }
}

impl TraceSink for RecorderSink {
    fn on_warning(&mut self, w: &Warning) {
        self.events.push(RecordedEvent::Warning(w.clone()));
    }

    fn on_node_mounted(&mut self, e: &NodeMountedEvent) {
        self.events.push(RecordedEvent::NodeMounted(*e));
    }

    fn on_node_moved(&mut self, e: &NodeMovedEvent) {
        self.events.push(RecordedEvent::NodeMoved(*e));
    }

    fn on_node_removed(&mut self, e: &NodeRemovedEvent) {
        self.events.push(RecordedEvent::NodeRemoved(*e));
    }

    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        self.events.push(RecordedEvent::FlushBegin(*e));
    }

    fn on_flush_end(&mut self, s: &FlushSummary) {
        self.events.push(RecordedEvent::FlushEnd(*s));
    }
}
