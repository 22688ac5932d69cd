// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Warnings and tracing for reconciliation and flushing.
//!
//! This module provides a [`TraceSink`] trait with one method per event. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] owns a boxed sink. [`Warning`]s are always delivered: they
//! report conditions the application should hear about (runaway jobs, failed
//! jobs, missing mount targets). The fine-grained node and flush events are
//! delivered only when the `trace` feature is **on**; when it is **off**,
//! those `Tracer` methods compile to nothing.
//!
//! # Crate features
//!
//! - `trace` enables node mount/move/remove events and flush begin/end
//!   events.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use crate::host::NodeId;
use crate::scheduler::JobError;

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// A non-fatal problem reported to the [`TraceSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A job exceeded the per-flush execution limit and was suppressed for
    /// the rest of the flush.
    RecursionLimit {
        /// The job's owner name, if it has one.
        owner: Option<String>,
        /// The configured limit.
        limit: u32,
    },
    /// A job body returned an error. The flush continued.
    JobFailed {
        /// The job's owner name, if it has one.
        owner: Option<String>,
        /// The error the job returned.
        error: JobError,
    },
    /// A mount target selector matched nothing and could not be created.
    MissingMountTarget {
        /// The selector as given.
        selector: String,
    },
    /// There was no node to mount into.
    NoMountNode,
    /// The template did not produce a root node.
    MissingRootNode,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecursionLimit { owner, limit } => {
                f.write_str("maximum recursive updates exceeded")?;
                if let Some(owner) = owner {
                    write!(f, " in <{owner}>")?;
                }
                write!(
                    f,
                    " (limit {limit}); an effect is mutating its own dependencies \
                     and re-triggering itself"
                )
            }
            Self::JobFailed { owner, error } => {
                f.write_str("job")?;
                if let Some(owner) = owner {
                    write!(f, " in <{owner}>")?;
                }
                write!(f, " failed: {error}")
            }
            Self::MissingMountTarget { selector } => write!(
                f,
                "failed to mount app: mount target selector \"{selector}\" returned nothing"
            ),
            Self::NoMountNode => f.write_str("there must be a mount element node"),
            Self::MissingRootNode => f.write_str("please provide a root node"),
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the reconciler creates and attaches a host node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeMountedEvent {
    /// The new node.
    pub node: NodeId,
    /// Where it was attached, if anywhere.
    pub parent: Option<NodeId>,
}

/// Emitted when the keyed list reconciler relocates an existing node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeMovedEvent {
    /// The moved node.
    pub node: NodeId,
    /// Its parent.
    pub parent: NodeId,
    /// The node it now precedes, or `None` when moved to the end.
    pub anchor: Option<NodeId>,
}

/// Emitted when the reconciler detaches a host node for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRemovedEvent {
    /// The removed node.
    pub node: NodeId,
    /// Its former parent.
    pub parent: Option<NodeId>,
}

/// Emitted when a flush starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushBeginEvent {
    /// Zero-based count of flushes completed before this one.
    pub flush_index: u64,
    /// Jobs queued at the start of the flush.
    pub queued: usize,
}

/// Totals for one flush, across all of its passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Same value as the matching [`FlushBeginEvent::flush_index`].
    pub flush_index: u64,
    /// Number of queue passes (at least one).
    pub passes: u32,
    /// Jobs whose body ran.
    pub jobs_run: u32,
    /// Jobs whose body returned an error.
    pub jobs_failed: u32,
    /// Queued jobs skipped because they were inactive.
    pub jobs_skipped: u32,
    /// Executions suppressed by the recursion guard.
    pub jobs_suppressed: u32,
    /// Post-flush callbacks that ran.
    pub post_flush_run: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives warnings and trace events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every [`Warning`], regardless of features.
    fn on_warning(&mut self, w: &Warning) {
        _ = w;
    }

    /// Called after a host node is created and attached.
    fn on_node_mounted(&mut self, e: &NodeMountedEvent) {
        _ = e;
    }

    /// Called after an existing host node is relocated.
    fn on_node_moved(&mut self, e: &NodeMovedEvent) {
        _ = e;
    }

    /// Called after a host node is removed.
    fn on_node_removed(&mut self, e: &NodeRemovedEvent) {
        _ = e;
    }

    /// Called when a flush starts.
    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        _ = e;
    }

    /// Called with the totals of a finished flush.
    fn on_flush_end(&mut self, s: &FlushSummary) {
        _ = s;
    }
}

/// Shared sinks, so a caller can keep a handle to the sink it installed.
impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
    fn on_warning(&mut self, w: &Warning) {
        self.borrow_mut().on_warning(w);
    }

    fn on_node_mounted(&mut self, e: &NodeMountedEvent) {
        self.borrow_mut().on_node_mounted(e);
    }

    fn on_node_moved(&mut self, e: &NodeMovedEvent) {
        self.borrow_mut().on_node_moved(e);
    }

    fn on_node_removed(&mut self, e: &NodeRemovedEvent) {
        self.borrow_mut().on_node_removed(e);
    }

    fn on_flush_begin(&mut self, e: &FlushBeginEvent) {
        self.borrow_mut().on_flush_begin(e);
    }

    fn on_flush_end(&mut self, s: &FlushSummary) {
        self.borrow_mut().on_flush_end(s);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer
// ---------------------------------------------------------------------------

/// Owner of a boxed [`TraceSink`].
///
/// Warnings always reach the sink. Every other method compiles to nothing
/// unless the `trace` feature is on.
pub struct Tracer {
    sink: Box<dyn TraceSink>,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[must_use]
    pub fn new(sink: impl TraceSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    /// Creates a tracer that discards everything.
    #[must_use]
    pub fn none() -> Self {
        Self::new(NoopSink)
    }

    /// Replaces the sink.
    pub fn set_sink(&mut self, sink: impl TraceSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Delivers a [`Warning`].
    #[inline]
    pub fn warning(&mut self, w: &Warning) {
        self.sink.on_warning(w);
    }

    /// Emits a [`NodeMountedEvent`].
    #[inline]
    pub fn node_mounted(&mut self, e: &NodeMountedEvent) {
        #[cfg(feature = "trace")]
        self.sink.on_node_mounted(e);
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeMovedEvent`].
    #[inline]
    pub fn node_moved(&mut self, e: &NodeMovedEvent) {
        #[cfg(feature = "trace")]
        self.sink.on_node_moved(e);
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeRemovedEvent`].
    #[inline]
    pub fn node_removed(&mut self, e: &NodeRemovedEvent) {
        #[cfg(feature = "trace")]
        self.sink.on_node_removed(e);
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushBeginEvent`].
    #[inline]
    pub fn flush_begin(&mut self, e: &FlushBeginEvent) {
        #[cfg(feature = "trace")]
        self.sink.on_flush_begin(e);
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushSummary`].
    #[inline]
    pub fn flush_end(&mut self, s: &FlushSummary) {
        #[cfg(feature = "trace")]
        self.sink.on_flush_end(s);
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct WarningSink {
        seen: Vec<String>,
        mounted: usize,
    }

    impl TraceSink for WarningSink {
        fn on_warning(&mut self, w: &Warning) {
            self.seen.push(w.to_string());
        }

        fn on_node_mounted(&mut self, _: &NodeMountedEvent) {
            self.mounted += 1;
        }
    }

    #[test]
    fn warnings_always_reach_the_sink() {
        let sink = Rc::new(RefCell::new(WarningSink::default()));
        let mut tracer = Tracer::new(Rc::clone(&sink));
        tracer.warning(&Warning::MissingRootNode);
        tracer.node_mounted(&NodeMountedEvent {
            node: NodeId::new(0, 0),
            parent: None,
        });
        assert_eq!(sink.borrow().seen, ["please provide a root node"]);
        let expected_mounts = if cfg!(feature = "trace") { 1 } else { 0 };
        assert_eq!(sink.borrow().mounted, expected_mounts);
    }

    #[test]
    fn warning_messages_name_the_owner() {
        let w = Warning::RecursionLimit {
            owner: Some("Counter".to_string()),
            limit: 100,
        };
        let text = w.to_string();
        assert!(text.starts_with("maximum recursive updates exceeded in <Counter> (limit 100)"));

        let w = Warning::JobFailed {
            owner: None,
            error: JobError::message("boom"),
        };
        assert_eq!(w.to_string(), "job failed: boom");

        let w = Warning::MissingMountTarget {
            selector: "main".to_string(),
        };
        assert!(w.to_string().contains("\"main\""));
    }

    #[test]
    fn noop_tracer_accepts_everything() {
        let mut tracer = Tracer::none();
        tracer.warning(&Warning::NoMountNode);
        tracer.flush_begin(&FlushBeginEvent {
            flush_index: 0,
            queued: 0,
        });
        tracer.flush_end(&FlushSummary::default());
    }
}
