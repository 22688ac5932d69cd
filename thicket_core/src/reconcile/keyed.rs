// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use crate::host::{HostTree, NodeId};
use crate::sequence::longest_increasing_subsequence;
use crate::trace::NodeMovedEvent;
use crate::vnode::{Key, VNode};

use super::Reconciler;

impl<H: HostTree> Reconciler<H> {
    /// Reconciles two child lists of `parent`.
    ///
    /// Matching runs at both ends are patched in place first. If one list is
    /// exhausted, the rest of the other is mounted or unmounted. Otherwise
    /// the unsettled middle of the old list is matched against the new one,
    /// by key where the old node has one and by a scan for an unclaimed
    /// same node where it does not. Unmatched old nodes are unmounted. New
    /// nodes are then placed back to front, each before its successor;
    /// nodes on the longest increasing run of old positions stay where they
    /// are.
    pub(super) fn patch_keyed_children(&mut self, old: &[VNode], new: &mut [VNode], parent: NodeId) {
        let mut start = 0;
        let mut old_end = old.len();
        let mut new_end = new.len();

        // Common prefix.
        while start < old_end && start < new_end && old[start].is_same(&new[start]) {
            self.patch(&old[start], &mut new[start]);
            start += 1;
        }

        // Common suffix.
        while start < old_end
            && start < new_end
            && old[old_end - 1].is_same(&new[new_end - 1])
        {
            self.patch(&old[old_end - 1], &mut new[new_end - 1]);
            old_end -= 1;
            new_end -= 1;
        }

        if start == old_end {
            let anchor = Self::first_el(&new[new_end..]);
            for node in &mut new[start..new_end] {
                self.mount(node, Some(parent), anchor);
            }
            return;
        }
        if start == new_end {
            for node in &old[start..old_end] {
                self.unmount(node);
            }
            return;
        }

        self.patch_unsettled(&old[start..old_end], new, start..new_end, parent);
    }

    /// Handles the middle section left over after the end scans.
    ///
    /// `new_range` indexes into `new`; nodes after it are already in place
    /// and serve as anchors.
    fn patch_unsettled(
        &mut self,
        old: &[VNode],
        new: &mut [VNode],
        new_range: core::ops::Range<usize>,
        parent: NodeId,
    ) {
        let base = new_range.start;
        let pending = new_range.len();

        let mut key_to_new: BTreeMap<Key, usize> = BTreeMap::new();
        for (offset, node) in new[new_range.clone()].iter().enumerate() {
            if let Some(key) = &node.key {
                key_to_new.insert(key.clone(), base + offset);
            }
        }

        // One entry per pending new node: 1 + the matched old index, or 0
        // for a node with no old counterpart.
        let mut new_to_old = vec![0_usize; pending];
        let mut patched = 0;
        let mut moved = false;
        let mut max_new_index = 0;

        for (old_index, prev) in old.iter().enumerate() {
            if patched >= pending {
                self.unmount(prev);
                continue;
            }
            let matched = match &prev.key {
                Some(key) => key_to_new.get(key).copied(),
                None => new_range
                    .clone()
                    .find(|&i| new_to_old[i - base] == 0 && prev.is_same(&new[i])),
            };
            match matched {
                Some(index) if new_to_old[index - base] == 0 => {
                    new_to_old[index - base] = old_index + 1;
                    if index >= max_new_index {
                        max_new_index = index;
                    } else {
                        moved = true;
                    }
                    self.patch(prev, &mut new[index]);
                    patched += 1;
                }
                // No counterpart, or a duplicate key already claimed.
                _ => self.unmount(prev),
            }
        }

        let stable: Vec<usize> = if moved {
            longest_increasing_subsequence(&new_to_old)
        } else {
            Vec::new()
        };
        let mut remaining = stable.len();

        for offset in (0..pending).rev() {
            let index = base + offset;
            let anchor = Self::first_el(&new[index + 1..]);
            if new_to_old[offset] == 0 {
                self.mount(&mut new[index], Some(parent), anchor);
            } else if moved {
                if remaining > 0 && stable[remaining - 1] == offset {
                    remaining -= 1;
                } else if let Some(el) = new[index].el() {
                    self.host.insert_before(parent, el, anchor);
                    self.tracer.node_moved(&NodeMovedEvent {
                        node: el,
                        parent,
                        anchor,
                    });
                }
            }
        }
    }
}
