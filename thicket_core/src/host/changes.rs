// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change sets drained from a [`NodeStore`](super::NodeStore).
//!
//! [`TreeChanges`] uses raw slot indices (`u32`) rather than
//! [`NodeId`](super::NodeId) handles so that presenters can read current
//! values through the store's `*_at()` accessors without generation checks.
//! Indices in [`removed`](TreeChanges::removed) refer to slots that are no
//! longer alive and must only be used to drop platform state.

use alloc::vec::Vec;

/// The set of changes since the previous
/// [`NodeStore::take_changes`](super::NodeStore::take_changes) call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeChanges {
    /// Nodes whose attributes changed.
    pub attributes: Vec<u32>,
    /// Nodes whose inline style changed.
    pub styles: Vec<u32>,
    /// Nodes whose listener set changed.
    pub listeners: Vec<u32>,
    /// Nodes whose text content was replaced.
    pub text: Vec<u32>,
    /// Nodes whose child list changed.
    pub topology: Vec<u32>,
    /// Nodes created since the last drain.
    pub added: Vec<u32>,
    /// Nodes released since the last drain.
    pub removed: Vec<u32>,
}

impl TreeChanges {
    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && self.styles.is_empty()
            && self.listeners.is_empty()
            && self.text.is_empty()
            && self.topology.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
    }

    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.styles.clear();
        self.listeners.clear();
        self.text.clear();
        self.topology.clear();
        self.added.clear();
        self.removed.clear();
    }
}
