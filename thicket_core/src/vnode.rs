// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual tree nodes.
//!
//! A [`VNode`] describes one node of the tree a render function wants to
//! see. It carries:
//!
//! - a [`Tag`] (or none, which mounts nothing),
//! - an optional [`Key`] used by keyed list reconciliation,
//! - [`Props`], split at construction time into attributes, style
//!   properties, event handlers, and a ref name,
//! - [`Children`]: nothing, one node, an ordered list of nodes, or a
//!   primitive value rendered as text,
//! - the [`NodeId`] of the host node it owns once mounted.
//!
//! Two nodes denote the same logical node across renders iff their tags and
//! keys are equal (see [`VNode::is_same`]). That is the only criterion the
//! reconciler uses to decide between patching in place and replacing.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use serde_json::Value;

use crate::host::NodeId;

/// Reserved prop key carrying a node's list key. Never written to the host.
pub const KEY_PROP: &str = "key";

/// Reserved prop key naming a node in the [`RefRegistry`](crate::refs::RefRegistry).
/// Never written to the host.
pub const REF_PROP: &str = "$ref";

/// Prop key prefix marking an event handler (`onClick` listens to `click`).
pub const EVENT_PREFIX: &str = "on";

/// Returns whether `key` is reserved and must not reach the host as an
/// attribute.
#[must_use]
pub fn is_reserved_prop(key: &str) -> bool {
    key == KEY_PROP || key == REF_PROP
}

/// Identifies the kind of host node a [`VNode`] produces.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A named element.
    Element(String),
    /// A fragment grouping its children.
    Fragment,
    /// A comment placeholder.
    Comment,
}

impl Tag {
    /// Creates an element tag.
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        Self::Element(name.into())
    }

    /// Parses a tag name, recognizing the `fragment`, `comment`, and `null`
    /// sentinels.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "fragment" => Self::Fragment,
            "comment" | "null" => Self::Comment,
            _ => Self::Element(name.to_string()),
        }
    }

    /// Returns the tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Element(name) => name,
            Self::Fragment => "fragment",
            Self::Comment => "comment",
        }
    }
}

/// An explicit identity token for list reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// A string key.
    Str(String),
    /// An integer key.
    Int(i64),
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl Key {
    /// Converts a [`KEY_PROP`] value. Integral numbers become
    /// [`Int`](Self::Int), other values their text; `Null` means no key.
    fn from_attr(value: AttrValue) -> Option<Self> {
        match value {
            AttrValue::Str(s) => Some(Self::Str(s)),
            AttrValue::Number(n) => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "the round trip below rejects anything that did not fit"
                )]
                let int = n as i64;
                Some(if int as f64 == n {
                    Self::Int(int)
                } else {
                    Self::Str(n.to_string())
                })
            }
            AttrValue::Bool(b) => Some(Self::Str(b.to_string())),
            AttrValue::Null => None,
        }
    }
}

/// An attribute value.
///
/// [`Null`](Self::Null) means "absent": patching to it removes the
/// attribute, and mounting skips it.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// A string value.
    Str(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value, written as `true` / `false`.
    Bool(bool),
    /// No value.
    Null,
}

impl AttrValue {
    /// Returns whether this is [`Null`](Self::Null).
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A shared event handler.
///
/// Handlers receive the host's event object as `&dyn Any`; each host
/// documents the concrete type it passes. Two handlers are equal iff they
/// are clones of the same handler.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&dyn Any)>);

impl EventHandler {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&dyn Any) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the handler.
    pub fn call(&self, event: &dyn Any) {
        (self.0)(event);
    }

    /// Returns whether both handles point at the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// Derives an event name from a handler prop key.
///
/// `onClick` and `onclick` both become `click`; a name without the
/// [`EVENT_PREFIX`] marker is taken as the event name itself.
#[must_use]
pub fn event_name(key: &str) -> String {
    match key.strip_prefix(EVENT_PREFIX) {
        Some(rest) if !rest.is_empty() => rest.to_ascii_lowercase(),
        _ => key.to_string(),
    }
}

/// Properties of a [`VNode`], partitioned by how they reach the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    /// Attributes, keyed by attribute name.
    pub attrs: BTreeMap<String, AttrValue>,
    /// Inline style properties.
    pub style: BTreeMap<String, String>,
    /// Event handlers, keyed by event name.
    pub events: BTreeMap<String, EventHandler>,
    /// Name under which the host node is registered in the ref registry.
    pub ref_name: Option<String>,
}

impl Props {
    /// Creates an empty set of props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether there are no props at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
            && self.style.is_empty()
            && self.events.is_empty()
            && self.ref_name.is_none()
    }

    /// Sets an attribute.
    ///
    /// The reserved [`REF_PROP`] key is routed to [`ref_name`](Self::ref_name)
    /// when the value is a string; [`KEY_PROP`] is kept but never written.
    /// Use [`VNode::attr`] or [`VNode::key`] to give a node its identity.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let key = key.into();
        let value = value.into();
        if key == REF_PROP {
            if let AttrValue::Str(name) = value {
                self.ref_name = Some(name);
            }
            return;
        }
        self.attrs.insert(key, value);
    }

    /// Sets one inline style property.
    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.style.insert(property.into(), value.into());
    }

    /// Registers an event handler under `key` (see [`event_name`]).
    pub fn set_handler(&mut self, key: &str, handler: EventHandler) {
        self.events.insert(event_name(key), handler);
    }
}

/// The children of a [`VNode`].
#[derive(Clone, Debug, Default)]
pub enum Children {
    /// No children.
    #[default]
    Empty,
    /// Exactly one child node.
    Node(Box<VNode>),
    /// An ordered sequence of child nodes.
    List(Vec<VNode>),
    /// Primitive content rendered as text (see [`coerce_text`](crate::text::coerce_text)).
    Text(Value),
}

impl Children {
    /// Returns whether the children are a nested virtual tree (a single node
    /// or a sequence of nodes) rather than primitive content.
    #[must_use]
    pub const fn is_vnode_shaped(&self) -> bool {
        matches!(self, Self::Node(_) | Self::List(_))
    }

    /// Returns the child nodes as a slice, empty for primitive content.
    #[must_use]
    pub fn nodes(&self) -> &[VNode] {
        match self {
            Self::Node(node) => core::slice::from_ref(node),
            Self::List(list) => list,
            Self::Empty | Self::Text(_) => &[],
        }
    }

    /// Returns the primitive content, treating [`Empty`](Self::Empty) as
    /// `null`. `None` for node-shaped children.
    #[must_use]
    pub fn primitive(&self) -> Option<&Value> {
        match self {
            Self::Empty => Some(&Value::Null),
            Self::Text(value) => Some(value),
            Self::Node(_) | Self::List(_) => None,
        }
    }
}

/// A virtual tree node.
#[derive(Clone, Debug, Default)]
pub struct VNode {
    /// Node kind; `None` mounts nothing.
    pub tag: Option<Tag>,
    /// List identity; `None` means "no explicit key".
    pub key: Option<Key>,
    /// Attributes, styles, handlers, and ref name.
    pub props: Props,
    /// Child content.
    pub children: Children,
    el: Option<NodeId>,
}

impl VNode {
    /// Creates an unmounted node with the given tag and nothing else.
    #[must_use]
    pub fn new(tag: Option<Tag>) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    /// Creates a node from a tag name (see [`Tag::parse`]).
    #[must_use]
    pub fn element(name: &str) -> Self {
        Self::new(Some(Tag::parse(name)))
    }

    /// Creates a fragment node.
    #[must_use]
    pub fn fragment() -> Self {
        Self::new(Some(Tag::Fragment))
    }

    /// Creates a comment placeholder node.
    #[must_use]
    pub fn comment() -> Self {
        Self::new(Some(Tag::Comment))
    }

    /// Creates a tagless node, which mounts nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Returns the host node this VNode owns, once mounted.
    #[must_use]
    pub const fn el(&self) -> Option<NodeId> {
        self.el
    }

    pub(crate) fn set_el(&mut self, el: Option<NodeId>) {
        self.el = el;
    }

    /// Returns whether `self` and `other` denote the same logical node:
    /// equal tags and equal keys (both absent counts as equal).
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self.tag == other.tag && self.key == other.key
    }

    // -- Builder API --

    /// Sets the list key.
    #[must_use]
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets an attribute (see [`Props::set_attr`]).
    ///
    /// A [`KEY_PROP`] attribute sets the node's [`key`](Self::key) instead.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let key = key.into();
        if key == KEY_PROP {
            self.key = Key::from_attr(value.into());
        } else {
            self.props.set_attr(key, value);
        }
        self
    }

    /// Sets an inline style property.
    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.set_style(property, value);
        self
    }

    /// Registers an event handler (see [`Props::set_handler`]).
    #[must_use]
    pub fn on(mut self, key: &str, handler: EventHandler) -> Self {
        self.props.set_handler(key, handler);
        self
    }

    /// Names the host node in the ref registry.
    #[must_use]
    pub fn ref_name(mut self, name: impl Into<String>) -> Self {
        self.props.ref_name = Some(name.into());
        self
    }

    /// Appends a child, turning the children into a list.
    ///
    /// Existing primitive content is discarded.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children = match core::mem::take(&mut self.children) {
            Children::List(mut list) => {
                list.push(child);
                Children::List(list)
            }
            Children::Node(first) => Children::List(alloc::vec![*first, child]),
            Children::Empty | Children::Text(_) => Children::List(alloc::vec![child]),
        };
        self
    }

    /// Replaces the children with a list.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children = Children::List(children.into_iter().collect());
        self
    }

    /// Replaces the children with exactly one node.
    #[must_use]
    pub fn single(mut self, child: Self) -> Self {
        self.children = Children::Node(Box::new(child));
        self
    }

    /// Replaces the children with primitive text content.
    #[must_use]
    pub fn text(mut self, content: impl Into<Value>) -> Self {
        self.children = Children::Text(content.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn same_node_requires_equal_tag_and_key() {
        let a = VNode::element("li").key("a");
        assert!(a.is_same(&VNode::element("li").key("a")));
        assert!(!a.is_same(&VNode::element("li").key("b")));
        assert!(!a.is_same(&VNode::element("p").key("a")));
        // Both keys absent counts as equal.
        assert!(VNode::element("li").is_same(&VNode::element("li")));
        assert!(!VNode::element("li").is_same(&a));
    }

    #[test]
    fn tag_sentinels_parse() {
        assert_eq!(Tag::parse("fragment"), Tag::Fragment);
        assert_eq!(Tag::parse("comment"), Tag::Comment);
        assert_eq!(Tag::parse("null"), Tag::Comment);
        assert_eq!(Tag::parse("div"), Tag::element("div"));
        assert_eq!(Tag::Fragment.name(), "fragment");
    }

    #[test]
    fn ref_prop_is_routed_out_of_attrs() {
        let node = VNode::element("input").attr(REF_PROP, "field").attr("id", "x");
        assert_eq!(node.props.ref_name.as_deref(), Some("field"));
        assert!(!node.props.attrs.contains_key(REF_PROP));
        assert!(is_reserved_prop(KEY_PROP));
    }

    #[test]
    fn key_prop_sets_identity() {
        let node = VNode::element("li").attr(KEY_PROP, "a");
        assert_eq!(node.key, Some(Key::from("a")));
        assert!(node.props.attrs.is_empty());
        assert!(node.is_same(&VNode::element("li").key("a")));

        assert_eq!(VNode::element("li").attr(KEY_PROP, 7).key, Some(Key::Int(7)));
        assert_eq!(
            VNode::element("li").attr(KEY_PROP, 1.5).key,
            Some(Key::from("1.5"))
        );
        let cleared = VNode::element("li").key("a").attr(KEY_PROP, None::<&str>);
        assert_eq!(cleared.key, None);
    }

    #[test]
    fn handler_keys_strip_marker() {
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onkeydown"), "keydown");
        assert_eq!(event_name("input"), "input");
        assert_eq!(event_name("on"), "on");
    }

    #[test]
    fn handlers_compare_by_identity() {
        let h = EventHandler::new(|_| {});
        let same = h.clone();
        let other = EventHandler::new(|_| {});
        assert_eq!(h, same);
        assert_ne!(h, other);
    }

    #[test]
    fn child_builder_promotes_to_list() {
        let node = VNode::element("ul")
            .single(VNode::element("li"))
            .child(VNode::element("li"));
        assert_eq!(node.children.nodes().len(), 2);
        assert!(node.children.is_vnode_shaped());

        let text = VNode::element("p").text("hi");
        assert!(!text.children.is_vnode_shaped());
        assert_eq!(text.children.nodes().len(), 0);
        assert!(VNode::element("ul").children(vec![]).children.is_vnode_shaped());
    }

    #[test]
    fn attr_values_display() {
        assert_eq!(AttrValue::from(3).to_string(), "3");
        assert_eq!(AttrValue::from(1.5).to_string(), "1.5");
        assert_eq!(AttrValue::from(false).to_string(), "false");
        assert!(AttrValue::from(None::<&str>).is_null());
    }
}
