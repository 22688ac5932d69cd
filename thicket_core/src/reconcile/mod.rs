// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual tree reconciliation.
//!
//! The [`Reconciler`] turns virtual trees into host mutations:
//!
//! 1. **Mount** ([`mount`](Reconciler::mount)) creates host nodes for a fresh
//!    tree, applies props, recurses into children, and attaches the result.
//! 2. **Patch** ([`patch`](Reconciler::patch)) diffs an old tree against a new
//!    one. Nodes that are [the same](crate::vnode::VNode::is_same) keep their
//!    host node and get a prop diff; others are replaced wholesale.
//! 3. **Keyed children** are diffed with a bidirectional scan. The middle
//!    section that neither end scan settles is matched by key (or by
//!    sameness for unkeyed nodes), and only the nodes that fall outside a
//!    [longest increasing subsequence](crate::sequence) of the old positions
//!    are moved.
//!
//! Host nodes are owned by the host. A [`VNode`] only records which node it
//! produced, so a tree that was mounted must be handed back to
//! [`patch`](Reconciler::patch) or [`unmount`](Reconciler::unmount) to keep
//! the host in sync.

mod keyed;
mod mount;
mod patch;

use crate::host::{HostTree, NodeId, NodeStore};
use crate::refs::RefRegistry;
use crate::trace::{NodeRemovedEvent, TraceSink, Tracer, Warning};
use crate::vnode::VNode;

/// Applies virtual trees to a [`HostTree`].
#[derive(Debug)]
pub struct Reconciler<H = NodeStore> {
    host: H,
    refs: RefRegistry,
    tracer: Tracer,
}

impl<H: HostTree> Reconciler<H> {
    /// Creates a reconciler writing to `host`.
    pub fn new(host: H) -> Self {
        Self {
            host,
            refs: RefRegistry::new(),
            tracer: Tracer::none(),
        }
    }

    /// Returns the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the reconciler and returns the host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Returns the ref registry.
    pub fn refs(&self) -> &RefRegistry {
        &self.refs
    }

    /// Replaces the diagnostics sink.
    pub fn set_sink(&mut self, sink: impl TraceSink + 'static) {
        self.tracer.set_sink(sink);
    }

    /// Reports a warning to the diagnostics sink.
    pub fn warn(&mut self, w: &Warning) {
        self.tracer.warning(w);
    }

    /// Detaches the host node `vnode` produced and releases its subtree.
    ///
    /// Refs registered by `vnode` or its descendants are dropped. Does
    /// nothing for a VNode that was never mounted.
    pub fn unmount(&mut self, vnode: &VNode) {
        let Some(el) = vnode.el() else {
            return;
        };
        let parent = self.host.parent(el);
        if let Some(parent) = parent {
            self.host.remove_child(parent, el);
        }
        self.refs.release(vnode);
        self.host.release(el);
        self.tracer
            .node_removed(&NodeRemovedEvent { node: el, parent });
    }

    /// Returns the host node of the first mounted entry in `nodes`, the
    /// anchor for content placed before them.
    fn first_el(nodes: &[VNode]) -> Option<NodeId> {
        nodes.iter().find_map(VNode::el)
    }
}
