// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for thicket.
//!
//! This crate puts a reconciled [`NodeStore`](thicket_core::host::NodeStore)
//! on screen in the browser:
//!
//! - [`DomPresenter`]: mirrors store changes into DOM nodes
//! - [`microtask::install`]: flushes a scheduler on the microtask queue
//! - [`WebRoot`]: both of the above wired to one reconciler

#![no_std]

extern crate alloc;

pub mod microtask;
mod presenter;
mod root;

pub use presenter::DomPresenter;
pub use root::WebRoot;
pub use thicket_core::backend::Presenter;
