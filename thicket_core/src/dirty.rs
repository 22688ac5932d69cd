// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for the in-memory host tree.
//!
//! [`NodeStore`](crate::host::NodeStore) records which nodes changed since
//! the last [`take_changes`](crate::host::NodeStore::take_changes) call using
//! multi-channel dirty tracking (via [`understory_dirty`]). Each channel is an
//! independent category of change, and all of them are local: only the
//! explicitly marked node appears in the drain output. Nothing a host node
//! carries is inherited by its descendants.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Draining surfaces the results as
//! [`TreeChanges`](crate::host::TreeChanges), which retained-mode
//! [presenters](crate::backend::Presenter) consume to mirror the store onto a
//! platform tree.

use understory_dirty::Channel;

/// An attribute was set or removed.
pub const ATTRIBUTES: Channel = Channel::new(0);

/// An inline style property was set or removed.
pub const STYLE: Channel = Channel::new(1);

/// An event listener was added or removed.
pub const LISTENERS: Channel = Channel::new(2);

/// Text content was replaced.
pub const TEXT: Channel = Channel::new(3);

/// The node's child list changed (marked on the parent).
pub const TOPOLOGY: Channel = Channel::new(4);
