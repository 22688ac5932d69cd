// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host node identity.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a host tree.
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is released and the slot is reused. Hosts
/// other than [`NodeStore`](super::NodeStore) may use the pair however they
/// like, as long as handles stay unique while the node is alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Slot index into the host's storage.
    pub(crate) idx: u32,
    /// Generation counter; must match the host's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Creates a handle from its raw parts.
    ///
    /// Intended for host implementations that allocate their own slots.
    #[inline]
    #[must_use]
    pub const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}
