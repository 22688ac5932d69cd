// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual tree reconciliation and batched update scheduling.
//!
//! `thicket_core` turns declarative trees of [`VNode`](vnode::VNode)s into
//! the minimal set of mutations on a retained host tree, and batches the
//! re-renders that cause them. It is `no_std` compatible (with `alloc`) and
//! talks to the platform only through the [`HostTree`](host::HostTree)
//! trait.
//!
//! # Architecture
//!
//! ```text
//!   App::invalidate() ──► Scheduler::enqueue() ──► flush
//!                                                   │
//!                 ┌─────────────────────────────────┘
//!                 ▼
//!   RenderEffect::run() ──► template() ──► Reconciler::patch()
//!                                                   │
//!                 ┌─────────────────────────────────┘
//!                 ▼
//!   HostTree (DOM, NodeStore) ──► TreeChanges ──► Presenter::apply()
//! ```
//!
//! **[`vnode`]**: The virtual node model. Tags, keys, split props
//! (attributes, style, handlers, ref name), and children.
//!
//! **[`reconcile`]**: Mount, patch, and keyed list reconciliation, driven by
//! the [`sequence`] solver to minimize moves.
//!
//! **[`host`]**: The host-tree contract and [`NodeStore`](host::NodeStore),
//! a struct-of-arrays in-memory host with generational handles, a mutation
//! log, and dirty tracking via `understory_dirty` (channels in [`dirty`]).
//!
//! **[`scheduler`]**: Deduplicating, id-ordered job queue with post-flush
//! callbacks, `next_tick`, and a per-flush recursion guard.
//!
//! **[`app`]**: An application root binding a template to a mount point and
//! a render job.
//!
//! **[`refs`]**: Named host node handles collected from `$ref` props.
//!
//! **[`tags`]** and **[`text`]**: Element name tables, namespaces, the
//! xlink attribute convention, and text coercion for primitive children.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait for mirroring
//! a [`NodeStore`](host::NodeStore) into a platform tree.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait, warnings, and event
//! types, with the [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables node and flush events on the
//!   trace sink. Warnings are delivered either way.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod app;
pub mod backend;
pub mod dirty;
pub mod host;
pub mod reconcile;
pub mod refs;
pub mod scheduler;
pub mod sequence;
pub mod tags;
pub mod text;
pub mod trace;
pub mod vnode;
