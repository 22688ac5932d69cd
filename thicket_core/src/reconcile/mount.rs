// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::ToString;

use crate::host::{HostTree, NodeId};
use crate::tags::AttrName;
use crate::text::coerce_text;
use crate::trace::NodeMountedEvent;
use crate::vnode::{Children, Props, VNode, is_reserved_prop};

use super::Reconciler;

impl<H: HostTree> Reconciler<H> {
    /// Creates the host subtree for `vnode` and attaches it.
    ///
    /// The new node is inserted into `container` before `anchor`. With no
    /// container it goes into the anchor's parent; with neither it stays
    /// detached. Children are mounted before the node is attached, so the
    /// host sees each subtree attached as a whole.
    ///
    /// Returns the new host node, or `None` for a tagless `vnode`, which
    /// mounts nothing.
    pub fn mount(
        &mut self,
        vnode: &mut VNode,
        container: Option<NodeId>,
        anchor: Option<NodeId>,
    ) -> Option<NodeId> {
        let tag = vnode.tag.as_ref()?;
        let el = self.host.create_node(tag);
        vnode.set_el(Some(el));

        self.apply_props(el, &vnode.props);
        self.mount_children(&mut vnode.children, el);

        let parent = container.or_else(|| anchor.and_then(|a| self.host.parent(a)));
        if let Some(parent) = parent {
            self.host.insert_before(parent, el, anchor);
        }
        self.tracer
            .node_mounted(&NodeMountedEvent { node: el, parent });
        Some(el)
    }

    /// Mounts node-shaped children into `el`, or writes primitive ones as
    /// its text.
    pub(super) fn mount_children(&mut self, children: &mut Children, el: NodeId) {
        match children {
            Children::Empty | Children::Text(serde_json::Value::Null) => {}
            Children::Text(value) => {
                let text = coerce_text(value);
                self.host.set_text_content(el, &text);
            }
            Children::Node(child) => {
                self.mount(child, Some(el), None);
            }
            Children::List(list) => {
                for child in list {
                    self.mount(child, Some(el), None);
                }
            }
        }
    }

    fn apply_props(&mut self, el: NodeId, props: &Props) {
        for (key, value) in &props.attrs {
            if is_reserved_prop(key) || value.is_null() {
                continue;
            }
            self.host
                .set_attribute(el, AttrName::parse(key), &value.to_string());
        }
        for (property, value) in &props.style {
            self.host.set_style(el, property, value);
        }
        for (event, handler) in &props.events {
            self.host.add_event_listener(el, event, handler);
        }
        if let Some(name) = &props.ref_name {
            self.refs.register(name, el);
        }
    }
}
