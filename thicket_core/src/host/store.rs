// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::Write as _;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::HostTree;
use super::changes::TreeChanges;
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::dirty;
use crate::tags::AttrName;
use crate::vnode::{EventHandler, Tag};

/// One recorded host mutation.
///
/// With its log enabled, [`NodeStore`] appends an entry for every mutating
/// call so that callers can assert on exactly what a mount or patch did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    /// A node was created.
    Create {
        /// The new node.
        node: NodeId,
    },
    /// An attribute was written.
    SetAttribute {
        /// Target node.
        node: NodeId,
        /// Qualified attribute name.
        name: String,
    },
    /// An attribute was removed.
    RemoveAttribute {
        /// Target node.
        node: NodeId,
        /// Qualified attribute name.
        name: String,
    },
    /// A style property was written.
    SetStyle {
        /// Target node.
        node: NodeId,
        /// Property name.
        property: String,
    },
    /// A style property was removed.
    RemoveStyle {
        /// Target node.
        node: NodeId,
        /// Property name.
        property: String,
    },
    /// A listener was registered.
    AddListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// A listener was unregistered.
    RemoveListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// Text content was replaced.
    SetText {
        /// Target node.
        node: NodeId,
    },
    /// A node was inserted into a parent.
    Insert {
        /// The new parent.
        parent: NodeId,
        /// The inserted node.
        child: NodeId,
        /// Whether `child` was attached elsewhere (or earlier in the same
        /// parent) before this call.
        moved: bool,
    },
    /// A node was detached from its parent.
    Remove {
        /// The old parent.
        parent: NodeId,
        /// The detached node.
        child: NodeId,
    },
    /// A subtree was released and its slots recycled.
    Release {
        /// Root of the released subtree.
        node: NodeId,
    },
}

impl HostOp {
    /// Returns whether this entry moved an already attached node.
    #[must_use]
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Insert { moved: true, .. })
    }
}

/// Struct-of-arrays storage for an in-memory host tree.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Released nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Node data --
    pub(crate) tag: Vec<Tag>,
    pub(crate) attrs: Vec<BTreeMap<String, String>>,
    pub(crate) style: Vec<BTreeMap<String, String>>,
    pub(crate) listeners: Vec<Vec<(String, EventHandler)>>,
    pub(crate) text: Vec<Option<String>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,

    // -- Document --
    body: Option<NodeId>,
    ops: Option<Vec<HostOp>>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty store with no body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            tag: Vec::new(),
            attrs: Vec::new(),
            style: Vec::new(),
            listeners: Vec::new(),
            text: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            body: None,
            ops: None,
        }
    }

    /// Creates a store containing a single `body` element, registered as the
    /// document body.
    #[must_use]
    pub fn with_body() -> Self {
        let mut store = Self::new();
        let body = store.create_node(&Tag::element("body"));
        store.body = Some(body);
        store
    }

    /// Turns on the operation log. Operations from before this call are not
    /// recorded.
    #[must_use]
    pub fn with_op_log(mut self) -> Self {
        self.ops.get_or_insert_with(Vec::new);
        self
    }

    // -- Allocation API --

    /// Creates a detached node and returns its handle.
    ///
    /// Comment nodes start with their tag name as text.
    pub fn create_node(&mut self, tag: &Tag) -> NodeId {
        let text = matches!(tag, Tag::Comment).then(|| tag.name().to_string());
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. Its generation was bumped on release.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.tag[i] = tag.clone();
            self.attrs[i].clear();
            self.style[i].clear();
            self.listeners[i].clear();
            self.text[i] = text;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.tag.push(tag.clone());
            self.attrs.push(BTreeMap::new());
            self.style.push(BTreeMap::new());
            self.listeners.push(Vec::new());
            self.text.push(text);
            self.generation.push(0);
            idx
        };

        self.pending_added.push(idx);
        let node = self.handle(idx);
        self.record(|| HostOp::Create { node });
        node
    }

    /// Releases a node and its entire subtree, freeing their slots for reuse.
    ///
    /// The node is detached first if it is still attached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, or if the subtree contains the body.
    pub fn release(&mut self, id: NodeId) {
        self.validate(id);
        assert!(
            self.body.is_none_or(|body| !self.contains(id, body)),
            "cannot release the document body"
        );
        if self.parent[id.idx as usize] != INVALID {
            let p = self.parent[id.idx as usize];
            self.unlink_from_parent(id.idx);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        let mut stack = alloc::vec![id.idx];
        while let Some(idx) = stack.pop() {
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            self.free_slot(idx);
        }
        self.record(|| HostOp::Release { node: id });
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns the document body, if one was registered.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    /// Registers `id` as the document body.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_body(&mut self, id: NodeId) {
        self.validate(id);
        self.body = Some(id);
    }

    // -- Topology API --

    /// Inserts `child` into `parent` before `anchor`, or appends it when
    /// `anchor` is `None`. An attached `child` is moved.
    ///
    /// # Panics
    ///
    /// Panics if any handle is stale, if `anchor` is not a child of
    /// `parent`, or if `child` is `parent` or one of its ancestors.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, anchor: Option<NodeId>) {
        self.validate(parent);
        self.validate(child);
        if let Some(anchor) = anchor {
            self.validate(anchor);
            assert!(
                self.parent[anchor.idx as usize] == parent.idx,
                "anchor is not a child of parent"
            );
        }
        assert!(
            !self.contains(child, parent),
            "cannot insert a node into its own subtree"
        );
        if anchor == Some(child) {
            return;
        }

        let p = parent.idx;
        let c = child.idx;
        let moved = self.parent[c as usize] != INVALID;
        if moved {
            let old_p = self.parent[c as usize];
            self.unlink_from_parent(c);
            self.dirty.mark(old_p, dirty::TOPOLOGY);
        }

        self.parent[c as usize] = p;
        match anchor {
            Some(anchor) => {
                let s = anchor.idx;
                let prev = self.prev_sibling[s as usize];
                self.next_sibling[c as usize] = s;
                self.prev_sibling[c as usize] = prev;
                if prev != INVALID {
                    self.next_sibling[prev as usize] = c;
                } else {
                    // `anchor` was the first child.
                    self.first_child[p as usize] = c;
                }
                self.prev_sibling[s as usize] = c;
            }
            None => {
                self.next_sibling[c as usize] = INVALID;
                self.prev_sibling[c as usize] = INVALID;
                if self.first_child[p as usize] == INVALID {
                    self.first_child[p as usize] = c;
                } else {
                    // Walk to last child.
                    let mut last = self.first_child[p as usize];
                    while self.next_sibling[last as usize] != INVALID {
                        last = self.next_sibling[last as usize];
                    }
                    self.next_sibling[last as usize] = c;
                    self.prev_sibling[c as usize] = last;
                }
            }
        }

        self.dirty.mark(p, dirty::TOPOLOGY);
        self.record(|| HostOp::Insert {
            parent,
            child,
            moved,
        });
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Same as [`insert_before`](Self::insert_before).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Detaches `child` from `parent`. The child stays alive.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == parent.idx,
            "node is not a child of parent"
        );
        self.unlink_from_parent(child.idx);
        self.dirty.mark(parent.idx, dirty::TOPOLOGY);
        self.record(|| HostOp::Remove { parent, child });
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.link(self.parent[id.idx as usize])
    }

    /// Returns the first child of a node, if any.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.link(self.first_child[id.idx as usize])
    }

    /// Returns the sibling following a node, if any.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.link(self.next_sibling[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    // -- Property getters --

    /// Returns the tag of a node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &Tag {
        self.validate(id);
        &self.tag[id.idx as usize]
    }

    /// Returns the value of an attribute (by qualified name).
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.validate(id);
        self.attrs[id.idx as usize].get(name).map(String::as_str)
    }

    /// Returns all attributes of a node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &BTreeMap<String, String> {
        self.validate(id);
        &self.attrs[id.idx as usize]
    }

    /// Returns the value of an inline style property.
    #[must_use]
    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.validate(id);
        self.style[id.idx as usize].get(property).map(String::as_str)
    }

    /// Returns the number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.validate(id);
        self.listeners[id.idx as usize]
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Returns the text content set directly on a node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.text[id.idx as usize].as_deref()
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets an attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        self.validate(id);
        self.attrs[id.idx as usize].insert(name.to_string(), value.to_string());
        self.dirty.mark(id.idx, dirty::ATTRIBUTES);
        self.record(|| HostOp::SetAttribute {
            node: id,
            name: name.to_string(),
        });
    }

    /// Removes an attribute. Removing an absent attribute is still recorded.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        self.validate(id);
        self.attrs[id.idx as usize].remove(name);
        self.dirty.mark(id.idx, dirty::ATTRIBUTES);
        self.record(|| HostOp::RemoveAttribute {
            node: id,
            name: name.to_string(),
        });
    }

    /// Sets an inline style property.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        self.validate(id);
        self.style[id.idx as usize].insert(property.to_string(), value.to_string());
        self.dirty.mark(id.idx, dirty::STYLE);
        self.record(|| HostOp::SetStyle {
            node: id,
            property: property.to_string(),
        });
    }

    /// Removes an inline style property.
    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        self.validate(id);
        self.style[id.idx as usize].remove(property);
        self.dirty.mark(id.idx, dirty::STYLE);
        self.record(|| HostOp::RemoveStyle {
            node: id,
            property: property.to_string(),
        });
    }

    /// Registers an event listener.
    pub fn add_event_listener(&mut self, id: NodeId, event: &str, handler: &EventHandler) {
        self.validate(id);
        self.listeners[id.idx as usize].push((event.to_string(), handler.clone()));
        self.dirty.mark(id.idx, dirty::LISTENERS);
        self.record(|| HostOp::AddListener {
            node: id,
            event: event.to_string(),
        });
    }

    /// Unregisters the first listener for `event` that is `handler`.
    pub fn remove_event_listener(&mut self, id: NodeId, event: &str, handler: &EventHandler) {
        self.validate(id);
        let listeners = &mut self.listeners[id.idx as usize];
        if let Some(pos) = listeners
            .iter()
            .position(|(name, h)| name == event && h.ptr_eq(handler))
        {
            listeners.remove(pos);
        }
        self.dirty.mark(id.idx, dirty::LISTENERS);
        self.record(|| HostOp::RemoveListener {
            node: id,
            event: event.to_string(),
        });
    }

    /// Replaces a node's content with `text`, detaching all its children.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        self.validate(id);
        let mut child = self.first_child[id.idx as usize];
        if child != INVALID {
            while child != INVALID {
                let next = self.next_sibling[child as usize];
                self.unlink_from_parent(child);
                child = next;
            }
            self.dirty.mark(id.idx, dirty::TOPOLOGY);
        }
        self.text[id.idx as usize] = Some(text.to_string());
        self.dirty.mark(id.idx, dirty::TEXT);
        self.record(|| HostOp::SetText { node: id });
    }

    // -- Events --

    /// Invokes every listener registered on `id` for `event`, passing
    /// `payload` through. Returns how many listeners ran.
    ///
    /// Events do not bubble.
    pub fn dispatch(&self, id: NodeId, event: &str, payload: &dyn Any) -> usize {
        self.validate(id);
        let handlers: Vec<EventHandler> = self.listeners[id.idx as usize]
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, h)| h.clone())
            .collect();
        for handler in &handlers {
            handler.call(payload);
        }
        handlers.len()
    }

    // -- Queries --

    /// Finds the first node in document order matching a simple selector:
    /// `#id`, `.class`, or a bare tag name.
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let matches = |idx: u32| -> bool {
            let attrs = &self.attrs[idx as usize];
            if let Some(id) = selector.strip_prefix('#') {
                attrs.get("id").is_some_and(|v| v == id)
            } else if let Some(class) = selector.strip_prefix('.') {
                attrs
                    .get("class")
                    .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
            } else {
                matches!(&self.tag[idx as usize], Tag::Element(name) if name == selector)
            }
        };

        for root in 0..self.len {
            if self.parent[root as usize] != INVALID || self.free_list.contains(&root) {
                continue;
            }
            let mut stack = alloc::vec![root];
            while let Some(idx) = stack.pop() {
                if matches(idx) {
                    return Some(self.handle(idx));
                }
                // Push children in reverse so the first child is visited first.
                let mut kids: Vec<u32> = Children::new(self, self.first_child[idx as usize])
                    .map(|c| c.idx)
                    .collect();
                kids.reverse();
                stack.extend(kids);
            }
        }
        None
    }

    /// Renders a node and its subtree as compact markup.
    ///
    /// Attributes appear in name order, followed by a `style` attribute if
    /// any style property is set. Fragments render only their content.
    #[must_use]
    pub fn to_markup(&self, id: NodeId) -> String {
        self.validate(id);
        let mut out = String::new();
        self.write_markup(id.idx, &mut out);
        out
    }

    // -- Operation log --

    /// Returns the operations recorded since the last
    /// [`take_ops`](Self::take_ops).
    ///
    /// Always empty unless the log was enabled with
    /// [`with_op_log`](Self::with_op_log).
    #[must_use]
    pub fn ops(&self) -> &[HostOp] {
        self.ops.as_deref().unwrap_or_default()
    }

    /// Drains the operation log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        self.ops.as_mut().map(core::mem::take).unwrap_or_default()
    }

    fn record(&mut self, op: impl FnOnce() -> HostOp) {
        if let Some(ops) = &mut self.ops {
            ops.push(op());
        }
    }

    // -- Change tracking --

    /// Drains all dirty channels and returns what changed since the last
    /// call.
    pub fn take_changes(&mut self) -> TreeChanges {
        let mut changes = TreeChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a
    /// caller-provided buffer.
    pub fn take_changes_into(&mut self, changes: &mut TreeChanges) {
        changes.clear();
        changes.attributes = self
            .dirty
            .drain(dirty::ATTRIBUTES)
            .deterministic()
            .run()
            .collect();
        changes.styles = self
            .dirty
            .drain(dirty::STYLE)
            .deterministic()
            .run()
            .collect();
        changes.listeners = self
            .dirty
            .drain(dirty::LISTENERS)
            .deterministic()
            .run()
            .collect();
        changes.text = self
            .dirty
            .drain(dirty::TEXT)
            .deterministic()
            .run()
            .collect();
        changes.topology = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    // -- Raw-index accessors for presenters --
    //
    // These accept raw slot indices (as found in `TreeChanges`) rather than
    // `NodeId` handles, skipping generation validation.

    /// Returns the tag at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn tag_at(&self, idx: u32) -> &Tag {
        self.check_slot(idx);
        &self.tag[idx as usize]
    }

    /// Returns the attributes at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn attributes_at(&self, idx: u32) -> &BTreeMap<String, String> {
        self.check_slot(idx);
        &self.attrs[idx as usize]
    }

    /// Returns the inline style at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn styles_at(&self, idx: u32) -> &BTreeMap<String, String> {
        self.check_slot(idx);
        &self.style[idx as usize]
    }

    /// Returns the `(event, handler)` pairs at raw slot `idx`, in
    /// registration order.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn listeners_at(&self, idx: u32) -> &[(String, EventHandler)] {
        self.check_slot(idx);
        &self.listeners[idx as usize]
    }

    /// Returns the text content at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn text_at(&self, idx: u32) -> Option<&str> {
        self.check_slot(idx);
        self.text[idx as usize].as_deref()
    }

    /// Returns the child slot indices at raw slot `idx`, in order.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn children_at(&self, idx: u32) -> Children<'_> {
        self.check_slot(idx);
        Children::new(self, self.first_child[idx as usize])
    }

    // -- Internal helpers --

    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn link(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| self.handle(idx))
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn check_slot(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    /// Returns whether `node` is `ancestor` or lies inside its subtree.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut idx = node.idx;
        while idx != INVALID {
            if idx == ancestor.idx {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Returns one slot to the free list. Links are left for the caller.
    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.attrs[i].clear();
        self.style[i].clear();
        self.listeners[i].clear();
        self.text[i] = None;
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);

        // A node created and released between drains never reaches presenters.
        if let Some(pos) = self.pending_added.iter().position(|&a| a == idx) {
            self.pending_added.remove(pos);
        } else {
            self.pending_removed.push(idx);
        }
    }

    fn write_markup(&self, idx: u32, out: &mut String) {
        let i = idx as usize;
        let text = self.text[i].as_deref().unwrap_or("");
        match &self.tag[i] {
            Tag::Comment => {
                let _ = write!(out, "<!--{text}-->");
                return;
            }
            Tag::Fragment => {}
            Tag::Element(name) => {
                out.push('<');
                out.push_str(name);
                for (key, value) in &self.attrs[i] {
                    let _ = write!(out, " {key}=\"{value}\"");
                }
                if !self.style[i].is_empty() {
                    out.push_str(" style=\"");
                    for (n, (property, value)) in self.style[i].iter().enumerate() {
                        if n > 0 {
                            out.push(' ');
                        }
                        let _ = write!(out, "{property}: {value};");
                    }
                    out.push('"');
                }
                out.push('>');
            }
        }
        out.push_str(text);
        let mut child = self.first_child[i];
        while child != INVALID {
            self.write_markup(child, out);
            child = self.next_sibling[child as usize];
        }
        if let Tag::Element(name) = &self.tag[i] {
            let _ = write!(out, "</{name}>");
        }
    }
}

impl HostTree for NodeStore {
    fn create_node(&mut self, tag: &Tag) -> NodeId {
        Self::create_node(self, tag)
    }

    fn set_attribute(&mut self, node: NodeId, name: AttrName<'_>, value: &str) {
        Self::set_attribute(self, node, name.qualified(), value);
    }

    fn remove_attribute(&mut self, node: NodeId, name: AttrName<'_>) {
        Self::remove_attribute(self, node, name.qualified());
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        Self::set_style(self, node, property, value);
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        Self::remove_style(self, node, property);
    }

    fn add_event_listener(&mut self, node: NodeId, event: &str, handler: &EventHandler) {
        Self::add_event_listener(self, node, event, handler);
    }

    fn remove_event_listener(&mut self, node: NodeId, event: &str, handler: &EventHandler) {
        Self::remove_event_listener(self, node, event, handler);
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        Self::set_text_content(self, node, text);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, anchor: Option<NodeId>) {
        Self::insert_before(self, parent, child, anchor);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        Self::remove_child(self, parent, child);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::next_sibling(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        Self::first_child(self, node)
    }

    fn release(&mut self, node: NodeId) {
        Self::release(self, node);
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        Self::query_selector(self, selector)
    }

    fn body(&self) -> Option<NodeId> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use super::*;

    fn div() -> Tag {
        Tag::element("div")
    }

    #[test]
    fn create_and_release() {
        let mut store = NodeStore::new();
        let id = store.create_node(&div());
        assert!(store.is_alive(id));
        store.release(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = store.create_node(&div());
        store.release(id1);
        let id2 = store.create_node(&div());
        // id2 reuses the same slot but has a different generation.
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn release_frees_whole_subtree() {
        let mut store = NodeStore::new();
        let root = store.create_node(&div());
        let child = store.create_node(&div());
        let grandchild = store.create_node(&div());
        store.append_child(root, child);
        store.append_child(child, grandchild);

        store.release(child);
        assert!(store.is_alive(root));
        assert!(!store.is_alive(child));
        assert!(!store.is_alive(grandchild));
        assert!(store.children(root).next().is_none());
    }

    #[test]
    fn insert_before_orders_children() {
        let mut store = NodeStore::new();
        let parent = store.create_node(&div());
        let a = store.create_node(&div());
        let b = store.create_node(&div());
        let c = store.create_node(&div());

        store.append_child(parent, a);
        store.append_child(parent, c);
        store.insert_before(parent, b, Some(c));

        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);
        assert_eq!(store.next_sibling(a), Some(b));
        assert_eq!(store.first_child(parent), Some(a));
    }

    #[test]
    fn inserting_attached_node_moves_it() {
        let mut store = NodeStore::new().with_op_log();
        let parent = store.create_node(&div());
        let a = store.create_node(&div());
        let b = store.create_node(&div());
        store.append_child(parent, a);
        store.append_child(parent, b);
        store.take_ops();

        store.insert_before(parent, b, Some(a));
        assert_eq!(store.children(parent).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(
            store.ops(),
            &[HostOp::Insert {
                parent,
                child: b,
                moved: true
            }]
        );
        assert!(store.ops()[0].is_move());
    }

    #[test]
    fn remove_child_detaches() {
        let mut store = NodeStore::new();
        let parent = store.create_node(&div());
        let child = store.create_node(&div());
        store.append_child(parent, child);
        store.remove_child(parent, child);
        assert_eq!(store.parent(child), None);
        assert!(store.is_alive(child));
    }

    #[test]
    #[should_panic(expected = "node is not a child of parent")]
    fn remove_foreign_child_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node(&div());
        let other = store.create_node(&div());
        store.remove_child(parent, other);
    }

    #[test]
    #[should_panic(expected = "cannot insert a node into its own subtree")]
    fn insert_into_descendant_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node(&div());
        let child = store.create_node(&div());
        store.append_child(parent, child);
        store.append_child(child, parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn released_handle_panics_on_parent() {
        let mut store = NodeStore::new();
        let id = store.create_node(&div());
        store.release(id);
        let _ = store.parent(id);
    }

    #[test]
    fn text_content_detaches_children() {
        let mut store = NodeStore::new();
        let parent = store.create_node(&div());
        let child = store.create_node(&div());
        store.append_child(parent, child);
        store.set_text_content(parent, "hello");
        assert_eq!(store.text(parent), Some("hello"));
        assert!(store.children(parent).next().is_none());
        assert_eq!(store.to_markup(parent), "<div>hello</div>");
    }

    #[test]
    fn op_log_is_off_unless_enabled() {
        let mut store = NodeStore::new();
        let p = store.create_node(&Tag::element("p"));
        for i in 0..1000 {
            store.set_text_content(p, &i.to_string());
            let _ = store.take_changes();
        }
        assert!(store.ops().is_empty());
        assert!(store.take_ops().is_empty());

        let mut store = NodeStore::with_body().with_op_log();
        assert!(store.ops().is_empty());
        let p = store.create_node(&Tag::element("p"));
        store.set_text_content(p, "x");
        assert_eq!(
            store.take_ops(),
            [HostOp::Create { node: p }, HostOp::SetText { node: p }]
        );
        assert!(store.ops().is_empty());
    }

    #[test]
    fn markup_lists_attributes_and_style() {
        let mut store = NodeStore::new();
        let root = store.create_node(&div());
        let frag = store.create_node(&Tag::Fragment);
        let span = store.create_node(&Tag::element("span"));
        let comment = store.create_node(&Tag::Comment);
        store.set_attribute(root, "id", "x");
        store.set_style(root, "color", "red");
        store.append_child(root, frag);
        store.append_child(frag, span);
        store.append_child(root, comment);
        assert_eq!(
            store.to_markup(root),
            "<div id=\"x\" style=\"color: red;\"><span></span><!--comment--></div>"
        );
    }

    #[test]
    fn query_selector_matches_id_class_and_tag() {
        let mut store = NodeStore::with_body();
        let body = store.body().unwrap();
        let a = store.create_node(&div());
        let b = store.create_node(&Tag::element("section"));
        store.set_attribute(a, "id", "app");
        store.set_attribute(b, "class", "main wide");
        store.append_child(body, a);
        store.append_child(body, b);

        assert_eq!(store.query_selector("#app"), Some(a));
        assert_eq!(store.query_selector(".wide"), Some(b));
        assert_eq!(store.query_selector("section"), Some(b));
        assert_eq!(store.query_selector("#missing"), None);
    }

    #[test]
    fn dispatch_runs_matching_listeners() {
        let mut store = NodeStore::new();
        let button = store.create_node(&Tag::element("button"));
        let hits = Rc::new(Cell::new(0));
        let handler = {
            let hits = Rc::clone(&hits);
            EventHandler::new(move |_| hits.set(hits.get() + 1))
        };
        store.add_event_listener(button, "click", &handler);
        assert_eq!(store.dispatch(button, "click", &()), 1);
        assert_eq!(store.dispatch(button, "input", &()), 0);
        store.remove_event_listener(button, "click", &handler);
        assert_eq!(store.dispatch(button, "click", &()), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn take_changes_reports_channels() {
        let mut store = NodeStore::new();
        let parent = store.create_node(&div());
        let child = store.create_node(&div());
        let changes = store.take_changes();
        assert_eq!(changes.added, vec![parent.idx, child.idx]);

        store.set_attribute(child, "title", "t");
        store.set_style(child, "color", "red");
        store.append_child(parent, child);
        let changes = store.take_changes();
        assert!(changes.attributes.contains(&child.idx));
        assert!(changes.styles.contains(&child.idx));
        assert!(changes.topology.contains(&parent.idx));
        assert!(changes.added.is_empty());

        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn short_lived_nodes_never_surface() {
        let mut store = NodeStore::new();
        let _ = store.take_changes();
        let tmp = store.create_node(&div());
        store.release(tmp);
        let changes = store.take_changes();
        assert!(changes.added.is_empty());
        assert!(changes.removed.is_empty());
    }
}
