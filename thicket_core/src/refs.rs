// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named node references.
//!
//! A VNode carrying a ref name registers its host node here when it is
//! mounted, so application code can reach specific host nodes without
//! walking the tree. The registry belongs to one
//! [`Reconciler`](crate::reconcile::Reconciler), and entries are dropped
//! when the node that owns them is unmounted.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use crate::host::NodeId;
use crate::vnode::VNode;

/// Maps ref names to the host nodes currently registered under them.
#[derive(Clone, Debug, Default)]
pub struct RefRegistry {
    nodes: BTreeMap<String, NodeId>,
}

impl RefRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name).copied()
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registers `node` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, node: NodeId) {
        self.nodes.insert(name.to_string(), node);
    }

    /// Removes `name` if it still refers to `node`.
    ///
    /// A name that was re-registered for a different node in the meantime is
    /// left alone.
    pub fn unregister(&mut self, name: &str, node: NodeId) {
        if self.nodes.get(name) == Some(&node) {
            self.nodes.remove(name);
        }
    }

    /// Unregisters every ref owned by `vnode` and its descendants.
    pub fn release(&mut self, vnode: &VNode) {
        if let (Some(name), Some(el)) = (&vnode.props.ref_name, vnode.el()) {
            self.unregister(name, el);
        }
        for child in vnode.children.nodes() {
            self.release(child);
        }
    }

    /// Iterates over all entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes.iter().map(|(name, &node)| (name.as_str(), node))
    }
}
