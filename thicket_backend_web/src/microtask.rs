// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Microtask flush driver.
//!
//! Browsers run microtasks as soon as the current task finishes, before
//! rendering. Routing a [`Scheduler`]'s flush requests there batches every
//! job queued during one event handler (or timer, or fetch callback) into a
//! single flush that lands before the next paint.

use alloc::rc::Rc;

use thicket_core::scheduler::Scheduler;
use wasm_bindgen_futures::spawn_local;

/// Makes `scheduler` flush on the microtask queue.
///
/// `after_flush` runs after every flush, typically to present the store the
/// jobs reconciled into. The requester holds the scheduler weakly, so a
/// dropped scheduler simply stops flushing.
pub fn install(scheduler: &Scheduler, after_flush: impl Fn() + 'static) {
    let weak = scheduler.downgrade();
    let after_flush: Rc<dyn Fn()> = Rc::new(after_flush);
    scheduler.set_flush_requester(move || {
        let weak = weak.clone();
        let after_flush = Rc::clone(&after_flush);
        spawn_local(async move {
            let Some(scheduler) = weak.upgrade() else {
                return;
            };
            scheduler.flush();
            after_flush();
        });
    });
}
