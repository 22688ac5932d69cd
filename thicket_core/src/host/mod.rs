// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host tree contract and the bundled in-memory host.
//!
//! The reconciler never touches a platform tree directly. Everything it does
//! goes through [`HostTree`], a small set of node construction, attribute,
//! listener, and topology primitives shaped after the DOM:
//!
//! - **Construction**: [`create_node`](HostTree::create_node) resolves a
//!   [`Tag`] to a concrete node, including namespaced elements (see
//!   [`tags`](crate::tags)), fragments, and comments.
//! - **Binding**: attributes (with xlink handling via [`AttrName`]), inline
//!   style properties, and event listeners.
//! - **Topology**: [`insert_before`](HostTree::insert_before) and
//!   [`remove_child`](HostTree::remove_child), plus the read-only
//!   [`parent`](HostTree::parent) / [`next_sibling`](HostTree::next_sibling)
//!   queries the reconciler needs to find anchors.
//!
//! [`NodeStore`] implements the contract over struct-of-arrays storage with
//! generational [`NodeId`] handles. It doubles as the test host (it keeps a
//! [`HostOp`] log) and as a retained model that presenters can mirror via
//! [`TreeChanges`].

mod changes;
mod id;
mod store;
mod traverse;

pub use changes::TreeChanges;
pub use id::{INVALID, NodeId};
pub use store::{HostOp, NodeStore};
pub use traverse::Children;

use crate::tags::AttrName;
use crate::vnode::{EventHandler, Tag};

/// Mutation and query primitives over a retained host tree.
///
/// Implementations may assume single-threaded, single-writer access. All
/// methods are infallible; platform failures are the implementation's to
/// swallow or report.
pub trait HostTree {
    /// Creates a detached node for `tag`.
    fn create_node(&mut self, tag: &Tag) -> NodeId;

    /// Sets an attribute to a string value.
    fn set_attribute(&mut self, node: NodeId, name: AttrName<'_>, value: &str);

    /// Removes an attribute entirely.
    fn remove_attribute(&mut self, node: NodeId, name: AttrName<'_>);

    /// Sets one inline style property.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Removes one inline style property.
    fn remove_style(&mut self, node: NodeId, property: &str);

    /// Registers `handler` for events named `event`.
    fn add_event_listener(&mut self, node: NodeId, event: &str, handler: &EventHandler);

    /// Unregisters a handler previously added with
    /// [`add_event_listener`](Self::add_event_listener).
    fn remove_event_listener(&mut self, node: NodeId, event: &str, handler: &EventHandler);

    /// Replaces the node's content with `text`.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    /// Inserts `child` into `parent` before `anchor`, or at the end when
    /// `anchor` is `None`.
    ///
    /// A `child` that is already attached somewhere is moved.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, anchor: Option<NodeId>);

    /// Detaches `child` from `parent`.
    fn remove_child(&mut self, parent: NodeId, child: NodeId);

    /// Returns the parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the sibling following `node`, if any.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the first child of `node`, if any.
    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Called once a detached subtree will never be used again.
    ///
    /// Hosts that hand out slot-based handles reclaim them here. The default
    /// does nothing.
    fn release(&mut self, node: NodeId) {
        _ = node;
    }

    /// Looks up a node by a simple selector (`#id`, `.class`, or a tag name).
    ///
    /// The default finds nothing.
    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        _ = selector;
        None
    }

    /// Returns the document body, the node new mount targets are created in.
    ///
    /// The default has no body.
    fn body(&self) -> Option<NodeId> {
        None
    }

    /// Detaches every child of `node`.
    fn clear_children(&mut self, node: NodeId) {
        while let Some(child) = self.first_child(node) {
            self.remove_child(node, child);
        }
    }
}
