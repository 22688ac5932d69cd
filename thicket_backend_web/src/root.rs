// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring for a complete DOM-backed setup.

use alloc::rc::Rc;
use core::cell::RefCell;

use thicket_core::app::App;
use thicket_core::backend::Presenter;
use thicket_core::host::NodeStore;
use thicket_core::reconcile::Reconciler;
use thicket_core::scheduler::{Scheduler, SchedulerConfig};
use thicket_core::trace::TraceSink;
use thicket_core::vnode::VNode;

use crate::microtask;
use crate::presenter::DomPresenter;

/// A reconciler over a [`NodeStore`], a [`DomPresenter`] mirroring it, and a
/// scheduler that flushes on the microtask queue and presents afterwards.
#[derive(Clone, Debug)]
pub struct WebRoot {
    surface: Rc<Surface>,
    scheduler: Scheduler,
}

/// The store and its presenter. Shared with the flush requester, which must
/// not hold the scheduler itself.
#[derive(Debug)]
struct Surface {
    reconciler: Rc<RefCell<Reconciler>>,
    presenter: RefCell<DomPresenter>,
}

impl Surface {
    fn present(&self) {
        let mut reconciler = self.reconciler.borrow_mut();
        let changes = reconciler.host_mut().take_changes();
        self.presenter
            .borrow_mut()
            .apply(reconciler.host(), &changes);
    }
}

impl WebRoot {
    /// Wires everything up around `presenter`.
    #[must_use]
    pub fn new(presenter: DomPresenter, config: SchedulerConfig) -> Self {
        let surface = Rc::new(Surface {
            reconciler: Rc::new(RefCell::new(Reconciler::new(NodeStore::with_body()))),
            presenter: RefCell::new(presenter),
        });
        let scheduler = Scheduler::new(config);
        let presented = Rc::clone(&surface);
        microtask::install(&scheduler, move || presented.present());
        Self { surface, scheduler }
    }

    /// Like [`new`](Self::new), rendering into `document.body` with the
    /// default scheduler configuration.
    #[must_use]
    pub fn for_body() -> Option<Self> {
        Some(Self::new(DomPresenter::for_body()?, SchedulerConfig::DEFAULT))
    }

    /// Installs a diagnostics sink on both the reconciler and the scheduler.
    pub fn set_sink<S: TraceSink + 'static>(&self, sink: &Rc<RefCell<S>>) {
        self.surface
            .reconciler
            .borrow_mut()
            .set_sink(Rc::clone(sink));
        self.scheduler.set_sink(Rc::clone(sink));
    }

    /// Creates an app rendering `template` and mounts it into `selector`.
    ///
    /// The first render is presented immediately; later renders are
    /// presented after each flush.
    pub fn mount(&self, selector: &str, template: impl Fn() -> VNode + 'static) -> App {
        let app = App::new(
            Rc::clone(&self.surface.reconciler),
            self.scheduler.clone(),
            template,
        );
        app.mount(selector);
        self.present();
        app
    }

    /// Mirrors pending store changes into the DOM.
    pub fn present(&self) {
        self.surface.present();
    }

    /// Returns the scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Returns the shared reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &Rc<RefCell<Reconciler>> {
        &self.surface.reconciler
    }
}
