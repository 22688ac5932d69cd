// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::ToString;

use crate::host::{HostTree, NodeId};
use crate::tags::AttrName;
use crate::text::coerce_text;
use crate::vnode::{Children, Props, VNode, is_reserved_prop};

use super::Reconciler;

impl<H: HostTree> Reconciler<H> {
    /// Brings the host subtree `old` produced in line with `new`.
    ///
    /// When `old` and `new` are [the same node](VNode::is_same), the host
    /// node is reused: props are diffed and children reconciled. Otherwise
    /// the old subtree is removed and `new` is mounted where it was. A
    /// tagless `old` left no host node behind, so a tagged `new` is mounted
    /// detached; single children are mounted into their parent instead.
    ///
    /// Afterwards `new` owns the host node and `old` must not be used with
    /// the reconciler again.
    ///
    /// # Panics
    ///
    /// Panics if `old` has a tag but was never mounted.
    pub fn patch(&mut self, old: &VNode, new: &mut VNode) {
        if old.tag.is_none() && new.tag.is_none() {
            return;
        }
        assert!(
            old.tag.is_none() || old.el().is_some(),
            "patch requires a mounted old node"
        );

        if !old.is_same(new) {
            self.replace(old, new);
            return;
        }
        let Some(el) = old.el() else {
            return;
        };
        new.set_el(Some(el));
        self.patch_props(el, &old.props, &new.props);
        self.patch_children(el, &old.children, &mut new.children);
    }

    fn replace(&mut self, old: &VNode, new: &mut VNode) {
        let (parent, anchor) = match old.el() {
            Some(el) => (self.host.parent(el), self.host.next_sibling(el)),
            None => (None, None),
        };
        self.unmount(old);
        self.mount(new, parent, anchor);
    }

    fn patch_props(&mut self, el: NodeId, old: &Props, new: &Props) {
        // -- Attributes --
        for (key, value) in &new.attrs {
            if is_reserved_prop(key) {
                continue;
            }
            let previous = old.attrs.get(key);
            if previous == Some(value) {
                continue;
            }
            if !value.is_null() {
                self.host
                    .set_attribute(el, AttrName::parse(key), &value.to_string());
            } else if previous.is_some_and(|p| !p.is_null()) {
                self.host.remove_attribute(el, AttrName::parse(key));
            }
        }
        for (key, value) in &old.attrs {
            if !is_reserved_prop(key) && !value.is_null() && !new.attrs.contains_key(key) {
                self.host.remove_attribute(el, AttrName::parse(key));
            }
        }

        // -- Style --
        for (property, value) in &new.style {
            if old.style.get(property) != Some(value) {
                self.host.set_style(el, property, value);
            }
        }
        for property in old.style.keys() {
            if !new.style.contains_key(property) {
                self.host.remove_style(el, property);
            }
        }

        // -- Listeners --
        for (event, handler) in &new.events {
            match old.events.get(event) {
                Some(previous) if previous.ptr_eq(handler) => {}
                Some(previous) => {
                    self.host.remove_event_listener(el, event, previous);
                    self.host.add_event_listener(el, event, handler);
                }
                None => self.host.add_event_listener(el, event, handler),
            }
        }
        for (event, handler) in &old.events {
            if !new.events.contains_key(event) {
                self.host.remove_event_listener(el, event, handler);
            }
        }

        // -- Ref --
        if old.ref_name != new.ref_name {
            if let Some(name) = &old.ref_name {
                self.refs.unregister(name, el);
            }
            if let Some(name) = &new.ref_name {
                self.refs.register(name, el);
            }
        }
    }

    fn patch_children(&mut self, el: NodeId, old: &Children, new: &mut Children) {
        match (old, new) {
            (Children::List(old), Children::List(new)) => {
                self.patch_keyed_children(old, new, el);
            }
            (Children::Node(old), Children::Node(new)) => {
                if old.tag.is_none() {
                    // Nothing was mounted for a tagless child, so there is no
                    // position to replace.
                    self.mount(new, Some(el), None);
                } else {
                    self.patch(old, new);
                }
            }
            (old, new) if !old.is_vnode_shaped() && !new.is_vnode_shaped() => {
                let (Some(previous), Some(next)) = (old.primitive(), new.primitive()) else {
                    return;
                };
                if previous != next {
                    let text = coerce_text(next);
                    self.host.set_text_content(el, &text);
                }
            }
            (old, new) => {
                // The shape changed: drop the old content, then mount the new.
                if old.is_vnode_shaped() {
                    for child in old.nodes() {
                        self.unmount(child);
                    }
                } else if old.primitive().is_some_and(|v| !v.is_null()) {
                    self.host.set_text_content(el, "");
                }
                self.mount_children(new, el);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use serde_json::json;

    use super::super::tests::{ops, setup};
    use crate::host::HostOp;
    use crate::vnode::{AttrValue, EventHandler};

    use super::*;

    fn list(items: &[&str]) -> VNode {
        VNode::element("ul").children(
            items
                .iter()
                .map(|k| VNode::element("li").key(*k).text(*k)),
        )
    }

    #[test]
    fn patching_an_identical_tree_emits_nothing() {
        let (mut r, root) = setup();
        let handler = EventHandler::new(|_| {});
        let mut old = VNode::element("section")
            .attr("id", "main")
            .style("color", "red")
            .on("onClick", handler)
            .ref_name("main")
            .child(list(&["a", "b", "c"]))
            .child(VNode::element("p").text(json!(["x", 1])));
        r.mount(&mut old, Some(root), None);
        ops(&mut r);

        let mut new = old.clone();
        r.patch(&old, &mut new);
        assert!(ops(&mut r).is_empty());
        assert_eq!(new.el(), old.el());
    }

    #[test]
    fn changed_attributes_are_updated_and_dropped_ones_removed() {
        let (mut r, root) = setup();
        let mut old = VNode::element("a")
            .attr("href", "/a")
            .attr("title", "t")
            .attr("rel", "x")
            .style("color", "red")
            .style("margin", "0");
        r.mount(&mut old, Some(root), None);

        let mut new = VNode::element("a")
            .attr("href", "/b")
            .attr("title", AttrValue::Null)
            .style("color", "blue");
        r.patch(&old, &mut new);

        let el = new.el().unwrap();
        assert_eq!(r.host().attribute(el, "href"), Some("/b"));
        assert_eq!(r.host().attribute(el, "title"), None);
        assert_eq!(r.host().attribute(el, "rel"), None);
        assert_eq!(r.host().style(el, "color"), Some("blue"));
        assert_eq!(r.host().style(el, "margin"), None);
    }

    #[test]
    fn xlink_attribute_is_removed() {
        let (mut r, root) = setup();
        let mut old = VNode::element("use").attr("xlink:href", "#a");
        r.mount(&mut old, Some(root), None);
        ops(&mut r);

        let mut new = VNode::element("use");
        r.patch(&old, &mut new);
        let el = new.el().unwrap();
        assert_eq!(
            ops(&mut r),
            [HostOp::RemoveAttribute {
                node: el,
                name: "xlink:href".into()
            }]
        );
    }

    #[test]
    fn different_tags_replace_in_place() {
        let (mut r, root) = setup();
        let mut old = VNode::element("div")
            .child(VNode::element("p").key(1))
            .child(VNode::element("span").key(2).ref_name("gone"))
            .child(VNode::element("i").key(3));
        r.mount(&mut old, Some(root), None);
        let mut new = VNode::element("div")
            .child(VNode::element("p").key(1))
            .child(VNode::element("em").key(2))
            .child(VNode::element("i").key(3));
        r.patch(&old, &mut new);

        assert_eq!(
            r.host().to_markup(root),
            "<div><div><p></p><em></em><i></i></div></div>"
        );
        assert!(r.refs().get("gone").is_none());
    }

    #[test]
    fn replacing_the_root_keeps_its_position() {
        let (mut r, root) = setup();
        let mut before = VNode::element("b");
        let mut old = VNode::element("p");
        let mut after = VNode::element("i");
        r.mount(&mut before, Some(root), None);
        r.mount(&mut old, Some(root), None);
        r.mount(&mut after, Some(root), None);

        let mut new = VNode::element("h1");
        r.patch(&old, &mut new);
        assert_eq!(r.host().to_markup(root), "<div><b></b><h1></h1><i></i></div>");
        assert!(!r.host().is_alive(old.el().unwrap()));
    }

    #[test]
    fn replaced_handler_is_swapped() {
        let (mut r, root) = setup();
        let mut old = VNode::element("button").on("onClick", EventHandler::new(|_| {}));
        r.mount(&mut old, Some(root), None);

        let mut new = VNode::element("button").on("onClick", EventHandler::new(|_| {}));
        r.patch(&old, &mut new);
        let el = new.el().unwrap();
        assert_eq!(r.host().listener_count(el, "click"), 1);

        let mut bare = VNode::element("button");
        r.patch(&new, &mut bare);
        assert_eq!(r.host().listener_count(el, "click"), 0);
    }

    #[test]
    fn renamed_ref_moves_registration() {
        let (mut r, root) = setup();
        let mut old = VNode::element("input").ref_name("a");
        r.mount(&mut old, Some(root), None);
        let mut new = VNode::element("input").ref_name("b");
        r.patch(&old, &mut new);
        assert_eq!(r.refs().get("a"), None);
        assert_eq!(r.refs().get("b"), new.el());
    }

    #[test]
    fn text_content_updates_only_when_changed() {
        let (mut r, root) = setup();
        let mut old = VNode::element("p").text(1);
        r.mount(&mut old, Some(root), None);
        ops(&mut r);

        let mut same = VNode::element("p").text(1);
        r.patch(&old, &mut same);
        assert!(ops(&mut r).is_empty());

        let mut cleared = VNode::element("p");
        r.patch(&same, &mut cleared);
        assert_eq!(r.host().to_markup(root), "<div><p></p></div>");
    }

    #[test]
    fn shape_switches_replace_content() {
        let (mut r, root) = setup();
        let mut old = VNode::element("p").text("hello");
        r.mount(&mut old, Some(root), None);

        let mut nodes = VNode::element("p").child(VNode::element("b")).child(VNode::element("i"));
        r.patch(&old, &mut nodes);
        assert_eq!(r.host().to_markup(root), "<div><p><b></b><i></i></p></div>");

        let mut single = VNode::element("p").single(VNode::element("u"));
        r.patch(&nodes, &mut single);
        assert_eq!(r.host().to_markup(root), "<div><p><u></u></p></div>");

        let mut text = VNode::element("p").text("bye");
        r.patch(&single, &mut text);
        assert_eq!(r.host().to_markup(root), "<div><p>bye</p></div>");
        assert_eq!(r.host().live_count(), 2);
    }

    #[test]
    fn single_child_is_patched_in_place() {
        let (mut r, root) = setup();
        let mut old = VNode::element("div").single(VNode::element("span").text("a"));
        r.mount(&mut old, Some(root), None);
        let span = old.children.nodes()[0].el();

        let mut new = VNode::element("div").single(VNode::element("span").text("b"));
        r.patch(&old, &mut new);
        assert_eq!(new.children.nodes()[0].el(), span);
        assert_eq!(r.host().to_markup(root), "<div><div><span>b</span></div></div>");
    }

    #[test]
    fn tagless_single_child_gains_a_node() {
        let (mut r, root) = setup();
        let mut old = VNode::element("div").single(VNode::empty());
        r.mount(&mut old, Some(root), None);
        assert_eq!(r.host().to_markup(root), "<div><div></div></div>");

        let mut shown = VNode::element("div").single(VNode::element("span").text("shown"));
        r.patch(&old, &mut shown);
        assert_eq!(
            r.host().to_markup(root),
            "<div><div><span>shown</span></div></div>"
        );
        let span = shown.children.nodes()[0].el().unwrap();
        assert_eq!(r.host().parent(span), shown.el());

        let mut hidden = VNode::element("div").single(VNode::empty());
        r.patch(&shown, &mut hidden);
        assert_eq!(r.host().to_markup(root), "<div><div></div></div>");
        assert!(!r.host().is_alive(span));
        assert_eq!(r.host().live_count(), 2);
    }

    #[test]
    fn tagless_to_tagless_is_a_noop() {
        let (mut r, _) = setup();
        let mut new = VNode::empty();
        r.patch(&VNode::empty(), &mut new);
        assert!(ops(&mut r).is_empty());
    }

    #[test]
    #[should_panic(expected = "patch requires a mounted old node")]
    fn patching_an_unmounted_node_panics() {
        let (mut r, _) = setup();
        let mut new = VNode::element("div");
        r.patch(&VNode::element("div"), &mut new);
    }

    #[test]
    fn list_growth_mounts_only_new_items() {
        let (mut r, root) = setup();
        let mut old = list(&["a", "b"]);
        r.mount(&mut old, Some(root), None);
        ops(&mut r);

        let mut new = list(&["a", "b", "c"]);
        r.patch(&old, &mut new);
        let creates: Vec<_> = ops(&mut r)
            .into_iter()
            .filter(|op| matches!(op, HostOp::Create { .. }))
            .collect();
        assert_eq!(creates.len(), 1);
        assert_eq!(
            r.host().to_markup(root),
            "<div><ul><li>a</li><li>b</li><li>c</li></ul></div>"
        );
    }
}
