// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM mirroring.
//!
//! Translates [`NodeStore`] state into live DOM nodes by applying incremental
//! updates from [`TreeChanges`]. The store's body maps onto a caller-supplied
//! root element; every other slot gets a DOM node of its own.
//!
//! Fragments become `display: contents` elements so they keep an identity
//! that can be moved and removed as a unit.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use thicket_core::backend::Presenter;
use thicket_core::host::{NodeId, NodeStore, TreeChanges};
use thicket_core::tags::{AttrName, XLINK_NS, namespace_of};
use thicket_core::vnode::{EventHandler, Tag};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{CssStyleDeclaration, Document, Element, Event, HtmlElement, Node, SvgElement};

type ListenerClosure = Closure<dyn Fn(Event)>;

struct Listener {
    event: String,
    handler: EventHandler,
    closure: ListenerClosure,
}

/// Last state written to the DOM for one store slot.
#[derive(Default)]
struct Slot {
    node: Option<Node>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    listeners: Vec<Listener>,
    children: Vec<u32>,
}

/// Mirrors a [`NodeStore`] into the DOM, applying incremental updates from
/// [`TreeChanges`].
///
/// Call [`apply`](Presenter::apply) after each flush with the store's drained
/// changes. Listener closures are owned by the presenter and dropped with the
/// node they were registered on.
pub struct DomPresenter {
    document: Document,
    root: Element,
    slots: Vec<Slot>,
}

impl core::fmt::Debug for DomPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPresenter")
            .field("root", &"Element")
            .field("slots_len", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl DomPresenter {
    /// Creates a presenter that renders the store's body into `root`.
    #[must_use]
    pub fn new(document: Document, root: Element) -> Self {
        Self {
            document,
            root,
            slots: Vec::new(),
        }
    }

    /// Creates a presenter rendering into `document.body`, if there is one.
    #[must_use]
    pub fn for_body() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let body = document.body()?;
        Some(Self::new(document, body.into()))
    }

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the DOM node mirroring the given store slot, if it exists.
    #[must_use]
    pub fn get_node(&self, idx: u32) -> Option<&Node> {
        self.slots.get(idx as usize).and_then(|slot| slot.node.as_ref())
    }

    fn slot_mut(&mut self, idx: u32) -> &mut Slot {
        let i = idx as usize;
        if self.slots.len() <= i {
            self.slots.resize_with(i + 1, Slot::default);
        }
        &mut self.slots[i]
    }

    fn create(&self, tag: &Tag) -> Node {
        let created = match tag {
            Tag::Element(name) => match namespace_of(name).uri() {
                Some(ns) => self.document.create_element_ns(Some(ns), name),
                None => self.document.create_element(name),
            },
            Tag::Fragment => self.document.create_element("div").inspect(|el| {
                if let Some(html) = el.dyn_ref::<HtmlElement>() {
                    let _ = html.style().set_property("display", "contents");
                }
            }),
            Tag::Comment => return self.document.create_comment(tag.name()).into(),
        };
        match created {
            Ok(el) => el.into(),
            // Invalid element names still get a node so the slot stays usable.
            Err(_) => self.document.create_comment(tag.name()).into(),
        }
    }

    fn sync_topology(&mut self, store: &NodeStore, idx: u32) {
        let desired: Vec<u32> = store.children_at(idx).map(NodeId::index).collect();
        let Some(parent) = self.get_node(idx).cloned() else {
            return;
        };
        let previous = core::mem::replace(&mut self.slot_mut(idx).children, desired.clone());

        // Children that left: detach them unless another parent claimed them.
        let keep: BTreeSet<u32> = desired.iter().copied().collect();
        for child in previous.into_iter().filter(|c| !keep.contains(c)) {
            if let Some(node) = self.get_node(child)
                && is_child_of(node, &parent)
            {
                let _ = parent.remove_child(node);
            }
        }

        // Place back to front, each before its successor, skipping nodes
        // that already sit there.
        let mut anchor: Option<Node> = None;
        for &child in desired.iter().rev() {
            let Some(node) = self.get_node(child).cloned() else {
                continue;
            };
            let in_place = is_child_of(&node, &parent)
                && match (node.next_sibling(), &anchor) {
                    (None, None) => true,
                    (Some(next), Some(anchor)) => next.is_same_node(Some(anchor)),
                    _ => false,
                };
            if !in_place {
                let _ = parent.insert_before(&node, anchor.as_ref());
            }
            anchor = Some(node);
        }
    }
}

impl Presenter for DomPresenter {
    /// Applies incremental changes from a [`TreeChanges`] to the DOM.
    fn apply(&mut self, store: &NodeStore, changes: &TreeChanges) {
        let body = store.body().map(NodeId::index);

        // 1. Removals
        for &idx in &changes.removed {
            let Some(slot) = self.slots.get_mut(idx as usize) else {
                continue;
            };
            let slot = core::mem::take(slot);
            if let Some(node) = slot.node {
                for l in slot.listeners {
                    let _ = node
                        .remove_event_listener_with_callback(&l.event, l.closure.as_ref().unchecked_ref());
                }
                if let Some(parent) = node.parent_node() {
                    let _ = parent.remove_child(&node);
                }
            }
        }

        // 2. Additions
        for &idx in &changes.added {
            let node = if Some(idx) == body {
                self.root.clone().into()
            } else {
                self.create(store.tag_at(idx))
            };
            *self.slot_mut(idx) = Slot {
                node: Some(node),
                ..Slot::default()
            };
        }

        // 3. Attributes
        for &idx in &changes.attributes {
            let Slot { node, attrs, .. } = self.slot_mut(idx);
            if let Some(el) = node.as_ref().and_then(|n| n.dyn_ref::<Element>()) {
                sync_attributes(el, attrs, store.attributes_at(idx));
            }
        }

        // 4. Styles
        for &idx in &changes.styles {
            let Slot { node, style, .. } = self.slot_mut(idx);
            if let Some(decl) = node.as_ref().and_then(style_of) {
                sync_style(&decl, style, store.styles_at(idx));
            }
        }

        // 5. Listeners
        for &idx in &changes.listeners {
            let Slot {
                node, listeners, ..
            } = self.slot_mut(idx);
            if let Some(node) = node {
                sync_listeners(node, listeners, store.listeners_at(idx));
            }
        }

        // 6. Text
        for &idx in &changes.text {
            if let Some(node) = self.get_node(idx) {
                node.set_text_content(store.text_at(idx));
            }
        }

        // 7. Topology
        for &idx in &changes.topology {
            self.sync_topology(store, idx);
        }
    }
}

fn is_child_of(node: &Node, parent: &Node) -> bool {
    node.parent_node()
        .is_some_and(|p| p.is_same_node(Some(parent)))
}

fn style_of(node: &Node) -> Option<CssStyleDeclaration> {
    if let Some(html) = node.dyn_ref::<HtmlElement>() {
        Some(html.style())
    } else {
        node.dyn_ref::<SvgElement>().map(SvgElement::style)
    }
}

fn set_attribute(el: &Element, name: &str, value: &str) {
    let _ = match AttrName::parse(name) {
        AttrName::XLink { qualified, .. } => el.set_attribute_ns(Some(XLINK_NS), qualified, value),
        AttrName::Plain(name) => el.set_attribute(name, value),
    };
}

fn remove_attribute(el: &Element, name: &str) {
    let _ = match AttrName::parse(name) {
        AttrName::XLink { local, .. } => el.remove_attribute_ns(Some(XLINK_NS), local),
        AttrName::Plain(name) => el.remove_attribute(name),
    };
}

fn sync_attributes(
    el: &Element,
    shadow: &mut BTreeMap<String, String>,
    current: &BTreeMap<String, String>,
) {
    for name in shadow.keys().filter(|n| !current.contains_key(*n)) {
        remove_attribute(el, name);
    }
    for (name, value) in current {
        if shadow.get(name) != Some(value) {
            set_attribute(el, name, value);
        }
    }
    shadow.clone_from(current);
}

fn sync_style(
    decl: &CssStyleDeclaration,
    shadow: &mut BTreeMap<String, String>,
    current: &BTreeMap<String, String>,
) {
    for property in shadow.keys().filter(|p| !current.contains_key(*p)) {
        let _ = decl.remove_property(property);
    }
    for (property, value) in current {
        if shadow.get(property) != Some(value) {
            let _ = decl.set_property(property, value);
        }
    }
    shadow.clone_from(current);
}

fn sync_listeners(node: &Node, registered: &mut Vec<Listener>, current: &[(String, EventHandler)]) {
    registered.retain(|l| {
        let keep = current
            .iter()
            .any(|(event, handler)| *event == l.event && handler.ptr_eq(&l.handler));
        if !keep {
            let _ = node
                .remove_event_listener_with_callback(&l.event, l.closure.as_ref().unchecked_ref());
        }
        keep
    });
    for (event, handler) in current {
        if registered
            .iter()
            .any(|l| l.event == *event && l.handler.ptr_eq(handler))
        {
            continue;
        }
        let h = handler.clone();
        let closure =
            Closure::wrap(Box::new(move |e: Event| h.call(&e)) as Box<dyn Fn(Event)>);
        let _ = node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        registered.push(Listener {
            event: event.clone(),
            handler: handler.clone(),
            closure,
        });
    }
}
