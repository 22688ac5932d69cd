// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! There are two ways to put a virtual tree on a platform:
//!
//! - **Direct**: implement [`HostTree`](crate::host::HostTree) over the
//!   platform's node API and hand it to the
//!   [`Reconciler`](crate::reconcile::Reconciler). Every mount and patch
//!   writes through immediately.
//!
//! - **Retained**: reconcile into a [`NodeStore`] and periodically mirror it
//!   with a [`Presenter`]. The store's dirty channels collapse repeated writes
//!   to the same node, so a presenter only touches what changed since its
//!   previous [`apply`](Presenter::apply).
//!
//! # Crate boundaries
//!
//! `thicket_core` owns the data model, reconciliation, scheduling, and this
//! contract module. Backend crates depend on `thicket_core` and provide
//! platform glue. Application code depends on both and wires them together.

use crate::host::{NodeStore, TreeChanges};

/// Applies drained store changes to a platform-native tree.
///
/// # Update loop pseudocode
///
/// ```rust,ignore
/// fn on_flush(store: &mut NodeStore, presenter: &mut impl Presenter) {
///     // Reconcile: jobs ran, the store now holds the new tree.
///     let changes = store.take_changes();
///
///     // Present: mirror incremental changes onto the native tree.
///     presenter.apply(store, &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies the given [`TreeChanges`] to the backing platform tree,
    /// reading current node state from `store` as needed.
    fn apply(&mut self, store: &NodeStore, changes: &TreeChanges);
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;
    use crate::vnode::Tag;

    /// Mirrors each live node's attributes and child order.
    #[derive(Default)]
    struct MirrorPresenter {
        attrs: BTreeMap<u32, BTreeMap<String, String>>,
        order: BTreeMap<u32, Vec<u32>>,
    }

    impl Presenter for MirrorPresenter {
        fn apply(&mut self, store: &NodeStore, changes: &TreeChanges) {
            for idx in &changes.removed {
                self.attrs.remove(idx);
                self.order.remove(idx);
            }
            for &idx in changes.added.iter().chain(&changes.attributes) {
                self.attrs.insert(idx, store.attributes_at(idx).clone());
            }
            for &idx in &changes.topology {
                let kids = store.children_at(idx).map(|c| c.index()).collect();
                self.order.insert(idx, kids);
            }
        }
    }

    #[test]
    fn presenter_follows_incremental_changes() {
        let mut store = NodeStore::new();
        let mut presenter = MirrorPresenter::default();
        let root = store.create_node(&Tag::element("ul"));
        let a = store.create_node(&Tag::element("li"));
        let b = store.create_node(&Tag::element("li"));
        store.append_child(root, a);
        store.append_child(root, b);
        store.set_attribute(a, "class", "first");
        let changes = store.take_changes();
        presenter.apply(&store, &changes);

        assert_eq!(presenter.order[&root.index()], [a.index(), b.index()]);
        assert_eq!(presenter.attrs[&a.index()]["class"], "first");

        store.insert_before(root, b, Some(a));
        store.release(a);
        let changes = store.take_changes();
        presenter.apply(&store, &changes);
        assert_eq!(presenter.order[&root.index()], [b.index()]);
        assert!(!presenter.attrs.contains_key(&a.index()));
    }
}
