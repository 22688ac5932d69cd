// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred units of work.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::cell::{Cell, RefCell};
use core::cmp::Ordering;
use core::fmt;

/// Error returned by a job body.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The body failed with a message.
    #[error("{0}")]
    Message(String),
    /// The job's target was already borrowed, typically because the job was
    /// run from inside a callback that holds it.
    #[error("job target is busy")]
    Busy,
}

impl JobError {
    /// Creates a [`JobError::Message`].
    #[must_use]
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for JobError {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_string())
    }
}

impl From<String> for JobError {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

/// Result of running a job body.
pub type JobResult = Result<(), JobError>;

/// Scheduling attributes of a [`Job`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobOptions {
    /// Ordering priority. Lower ids run first; `None` runs after every id.
    pub id: Option<u64>,
    /// Among jobs with equal ids, pre jobs run first.
    pub pre: bool,
    /// Whether the job may be queued again while it is running.
    pub allow_recurse: bool,
    /// Name of whatever owns the job, used in diagnostics.
    pub owner: Option<String>,
}

struct JobInner {
    body: RefCell<Box<dyn FnMut() -> JobResult>>,
    options: JobOptions,
    active: Cell<bool>,
}

/// A shared, deferred unit of work.
///
/// Cloning a `Job` yields another handle to the same job. The scheduler
/// deduplicates by that identity: two handles to one job are one queue
/// entry, while two jobs wrapping identical closures are two.
#[derive(Clone)]
pub struct Job(Rc<JobInner>);

impl Job {
    /// Creates a job with default options.
    pub fn new(body: impl FnMut() -> JobResult + 'static) -> Self {
        Self::with_options(JobOptions::default(), body)
    }

    /// Creates a job with the given options.
    pub fn with_options(options: JobOptions, body: impl FnMut() -> JobResult + 'static) -> Self {
        Self(Rc::new(JobInner {
            body: RefCell::new(Box::new(body)),
            options,
            active: Cell::new(true),
        }))
    }

    /// Creates a job named `owner` in diagnostics, otherwise with default
    /// options.
    pub fn with_owner(
        owner: impl Into<String>,
        body: impl FnMut() -> JobResult + 'static,
    ) -> Self {
        Self::with_options(
            JobOptions {
                owner: Some(owner.into()),
                ..JobOptions::default()
            },
            body,
        )
    }

    /// Creates a job with default options from an infallible closure.
    pub fn from_fn(mut body: impl FnMut() + 'static) -> Self {
        Self::new(move || {
            body();
            Ok(())
        })
    }

    /// Returns the job's options.
    #[must_use]
    pub fn options(&self) -> &JobOptions {
        &self.0.options
    }

    /// Returns the ordering id.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.0.options.id
    }

    /// Returns the owner name.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.0.options.owner.as_deref()
    }

    /// Returns whether the job will run when its turn comes.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.active.get()
    }

    /// Marks the job active or inactive.
    ///
    /// An inactive job stays queued but is skipped when the flush reaches it.
    /// A job that is already running is not interrupted.
    pub fn set_active(&self, active: bool) {
        self.0.active.set(active);
    }

    /// Returns whether both handles refer to the same job.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity key, stable while any handle is alive.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).addr()
    }

    pub(crate) fn sort_key(&self) -> u64 {
        self.id().unwrap_or(u64::MAX)
    }

    /// Runs the body. A body that is already running reports
    /// [`JobError::Busy`] instead of re-entering.
    pub(crate) fn run(&self) -> JobResult {
        match self.0.body.try_borrow_mut() {
            Ok(mut body) => body(),
            Err(_) => Err(JobError::Busy),
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("options", &self.0.options)
            .field("active", &self.0.active.get())
            .finish_non_exhaustive()
    }
}

/// Flush order: ascending id (absent last), pre jobs first among equals.
pub(crate) fn flush_order(a: &Job, b: &Job) -> Ordering {
    a.sort_key()
        .cmp(&b.sort_key())
        .then_with(|| b.0.options.pre.cmp(&a.0.options.pre))
}
