// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Application root.
//!
//! An [`App`] ties a template function to a mount point. Mounting renders the
//! template once, synchronously. After that, [`App::invalidate`] queues a
//! re-render on the [`Scheduler`]; however many invalidations happen in one
//! turn, the flush renders once and patches the previous tree.
//!
//! Mount targets are either a host node or a selector. A selector that
//! matches nothing but looks like `#id` or `.class` gets a fresh `div`
//! carrying that id or class, inserted as the first child of the host body.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use crate::host::{HostTree, NodeId, NodeStore};
use crate::reconcile::Reconciler;
use crate::scheduler::{Job, JobError, JobOptions, JobResult, Scheduler};
use crate::tags::AttrName;
use crate::trace::Warning;
use crate::vnode::{Tag, VNode};

/// Where an [`App`] mounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MountTarget {
    /// An existing host node.
    Node(NodeId),
    /// A simple selector (`#id`, `.class`, or a tag name).
    Selector(String),
}

impl From<NodeId> for MountTarget {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for MountTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.into())
    }
}

impl From<String> for MountTarget {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// The rendered state of an app.
#[derive(Debug, Default)]
struct View {
    container: Option<NodeId>,
    tree: Option<VNode>,
}

/// Renders a template into a container, remembering the tree it produced.
///
/// The first run after the container is known mounts; later runs patch the
/// remembered tree. Runs before the app is mounted do nothing.
pub struct RenderEffect<H = NodeStore> {
    reconciler: Rc<RefCell<Reconciler<H>>>,
    template: Rc<dyn Fn() -> VNode>,
    view: RefCell<View>,
}

impl<H> fmt::Debug for RenderEffect<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEffect")
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl<H: HostTree> RenderEffect<H> {
    /// Renders the template and applies it.
    ///
    /// Fails with [`JobError::Busy`] when the reconciler is already borrowed,
    /// e.g. when the template itself triggers a synchronous render.
    pub fn run(&self) -> JobResult {
        let mut view = self.view.try_borrow_mut().map_err(|_| JobError::Busy)?;
        let Some(container) = view.container else {
            return Ok(());
        };
        let mut next = (self.template)();
        let mut reconciler = self
            .reconciler
            .try_borrow_mut()
            .map_err(|_| JobError::Busy)?;
        if next.tag.is_none() {
            reconciler.warn(&Warning::MissingRootNode);
            return Ok(());
        }
        match view.tree.take() {
            Some(prev) => reconciler.patch(&prev, &mut next),
            None => {
                reconciler.mount(&mut next, Some(container), None);
            }
        }
        view.tree = Some(next);
        Ok(())
    }
}

/// An application root: a template, a reconciler, and a render job.
pub struct App<H = NodeStore> {
    effect: Rc<RenderEffect<H>>,
    scheduler: Scheduler,
    job: Job,
}

impl<H> fmt::Debug for App<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("effect", &self.effect)
            .field("job", &self.job)
            .finish_non_exhaustive()
    }
}

impl<H: HostTree + 'static> App<H> {
    /// Creates an unmounted app rendering `template`.
    pub fn new(
        reconciler: Rc<RefCell<Reconciler<H>>>,
        scheduler: Scheduler,
        template: impl Fn() -> VNode + 'static,
    ) -> Self {
        Self::with_options(reconciler, scheduler, JobOptions::default(), template)
    }

    /// Like [`new`](Self::new), with explicit options for the render job.
    pub fn with_options(
        reconciler: Rc<RefCell<Reconciler<H>>>,
        scheduler: Scheduler,
        options: JobOptions,
        template: impl Fn() -> VNode + 'static,
    ) -> Self {
        let effect = Rc::new(RenderEffect {
            reconciler,
            template: Rc::new(template),
            view: RefCell::new(View::default()),
        });
        let job = {
            let effect = Rc::clone(&effect);
            Job::with_options(options, move || effect.run())
        };
        Self {
            effect,
            scheduler,
            job,
        }
    }

    /// Resolves `target` and mounts a first render into it.
    ///
    /// Returns the root host node, or `None` after reporting a warning when
    /// there is no mount point or the template has no root.
    ///
    /// # Panics
    ///
    /// Panics if the reconciler is borrowed elsewhere.
    pub fn mount(&self, target: impl Into<MountTarget>) -> Option<NodeId> {
        let mut reconciler = self.effect.reconciler.borrow_mut();
        let Some(container) = resolve_target(&mut reconciler, target.into()) else {
            reconciler.warn(&Warning::NoMountNode);
            return None;
        };
        let mut tree = (self.effect.template)();
        if tree.tag.is_none() {
            reconciler.warn(&Warning::MissingRootNode);
            return None;
        }
        let root = reconciler.mount(&mut tree, Some(container), None);
        *self.effect.view.borrow_mut() = View {
            container: Some(container),
            tree: Some(tree),
        };
        root
    }

    /// Queues a re-render.
    pub fn invalidate(&self) {
        self.scheduler.enqueue(&self.job);
    }

    /// Empties the container and mounts a fresh render, discarding the
    /// current tree. Does nothing before [`mount`](Self::mount).
    ///
    /// # Panics
    ///
    /// Panics if the reconciler is borrowed elsewhere.
    pub fn reset_view(&self) {
        let mut view = self.effect.view.borrow_mut();
        let Some(container) = view.container else {
            return;
        };
        let mut reconciler = self.effect.reconciler.borrow_mut();
        if let Some(prev) = view.tree.take() {
            reconciler.unmount(&prev);
        }
        reconciler.host_mut().clear_children(container);

        let mut tree = (self.effect.template)();
        if tree.tag.is_none() {
            reconciler.warn(&Warning::MissingRootNode);
            return;
        }
        reconciler.mount(&mut tree, Some(container), None);
        view.tree = Some(tree);
    }

    /// Returns the container the app is mounted in.
    #[must_use]
    pub fn container(&self) -> Option<NodeId> {
        self.effect.view.borrow().container
    }

    /// Returns the current root host node.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.effect.view.borrow().tree.as_ref().and_then(VNode::el)
    }

    /// Returns the render job.
    #[must_use]
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Returns the render effect.
    #[must_use]
    pub fn effect(&self) -> &RenderEffect<H> {
        &self.effect
    }

    /// Returns the shared reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &Rc<RefCell<Reconciler<H>>> {
        &self.effect.reconciler
    }
}

fn resolve_target<H: HostTree>(
    reconciler: &mut Reconciler<H>,
    target: MountTarget,
) -> Option<NodeId> {
    let selector = match target {
        MountTarget::Node(node) => return Some(node),
        MountTarget::Selector(selector) => selector,
    };
    if let Some(found) = reconciler.host().query_selector(&selector) {
        return Some(found);
    }
    let (attr, value) = if let Some(id) = selector.strip_prefix('#') {
        ("id", id)
    } else if let Some(class) = selector.strip_prefix('.') {
        ("class", class)
    } else {
        reconciler.warn(&Warning::MissingMountTarget { selector });
        return None;
    };
    let host = reconciler.host_mut();
    let body = host.body()?;
    let div = host.create_node(&Tag::element("div"));
    host.set_attribute(div, AttrName::Plain(attr), value);
    let first = host.first_child(body);
    host.insert_before(body, div, first);
    Some(div)
}
