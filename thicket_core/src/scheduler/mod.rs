// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched, deduplicated job scheduling.
//!
//! The [`Scheduler`] collects [`Job`]s submitted during a synchronous turn and
//! runs them in one ordered pass, the *flush*, at the next suspension point.
//! It is a cheap, clonable handle; all clones share one queue.
//!
//! # Lifecycle
//!
//! ```text
//! idle ──enqueue──▶ pending ──flush──▶ flushing ──drained──▶ idle
//! ```
//!
//! [`enqueue`](Scheduler::enqueue) inserts a job unless it is already queued
//! at or after the flush cursor, then requests a flush. Requesting is
//! idempotent: however many jobs arrive in one turn, exactly one flush is
//! requested. How the flush actually gets run is up to the embedder:
//!
//! - install a [flush requester](Scheduler::set_flush_requester) that
//!   schedules [`flush`](Scheduler::flush) on the platform's microtask queue
//!   (the web backend does this), or
//! - call [`run_pending`](Scheduler::run_pending) at a convenient point.
//!
//! # Flush
//!
//! A flush stable-sorts the queue by `(id, pre first)` and runs each active
//! job in order. Inactive jobs are skipped. Failed jobs are reported as
//! [`Warning::JobFailed`] and the pass continues. After the pass the queue is
//! cleared and post-flush callbacks are drained. If jobs or callbacks were
//! added meanwhile, another pass runs, until nothing is left.
//!
//! A recursion guard counts executions per job over the whole
//! flush. A job that would exceed [`SchedulerConfig::recursion_limit`] is
//! suppressed for the rest of the flush and reported once as
//! [`Warning::RecursionLimit`].
//!
//! # Re-entrancy
//!
//! Jobs run without any internal borrow held, so they may enqueue jobs,
//! enqueue post-flush callbacks, and call [`next_tick`](Scheduler::next_tick).
//! Calling [`flush`](Scheduler::flush) from inside a job does nothing. The
//! [`TraceSink`](crate::trace::TraceSink) installed with
//! [`set_sink`](Scheduler::set_sink) is called with the scheduler borrowed and
//! must not call back into it.

mod guard;
mod job;
mod tick;

pub use job::{Job, JobError, JobOptions, JobResult};
pub use tick::NextTick;

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::ToString;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::task::Waker;

use guard::{RecursionGuard, Verdict};
use job::flush_order;

use crate::trace::{FlushBeginEvent, FlushSummary, TraceSink, Tracer, Warning};

/// Configuration for the [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum executions of one job within a single flush.
    pub recursion_limit: u32,
}

impl SchedulerConfig {
    /// The default configuration: at most 100 executions per job per flush.
    pub const DEFAULT: Self = Self {
        recursion_limit: 100,
    };
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

type TickCallback = Box<dyn FnOnce()>;

struct State {
    config: SchedulerConfig,

    // -- Main queue --
    queue: Vec<Job>,
    flush_index: usize,
    flushing: bool,
    flush_pending: bool,

    // -- Post-flush callbacks --
    pending_post: Vec<Job>,
    active_post: Option<Vec<Job>>,
    post_index: usize,

    // -- Tick waiters --
    completed: u64,
    wakers: Vec<Waker>,
    tick_callbacks: Vec<TickCallback>,

    // -- Embedding --
    requester: Option<Rc<dyn Fn()>>,
    tracer: Tracer,
}

/// A deduplicating, id-ordered job queue with batched flushing.
///
/// See the [module docs](self) for the flush algorithm.
#[derive(Clone)]
pub struct Scheduler {
    state: Rc<RefCell<State>>,
}

/// A non-owning handle to a [`Scheduler`], for flush requesters that would
/// otherwise keep their scheduler alive.
#[derive(Clone)]
pub struct WeakScheduler {
    state: Weak<RefCell<State>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(st) => f
                .debug_struct("Scheduler")
                .field("config", &st.config)
                .field("queued", &st.queue.len())
                .field("flushing", &st.flushing)
                .field("flush_pending", &st.flush_pending)
                .field("completed", &st.completed)
                .finish_non_exhaustive(),
            Err(_) => f.debug_struct("Scheduler").finish_non_exhaustive(),
        }
    }
}

impl fmt::Debug for WeakScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakScheduler").finish_non_exhaustive()
    }
}

impl WeakScheduler {
    /// Returns the scheduler if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Scheduler> {
        self.state.upgrade().map(|state| Scheduler { state })
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::DEFAULT)
    }
}

impl Scheduler {
    /// Creates an idle scheduler with the given configuration.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                config,
                queue: Vec::new(),
                flush_index: 0,
                flushing: false,
                flush_pending: false,
                pending_post: Vec::new(),
                active_post: None,
                post_index: 0,
                completed: 0,
                wakers: Vec::new(),
                tick_callbacks: Vec::new(),
                requester: None,
                tracer: Tracer::none(),
            })),
        }
    }

    /// Returns a non-owning handle.
    #[must_use]
    pub fn downgrade(&self) -> WeakScheduler {
        WeakScheduler {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.state.borrow().config
    }

    /// Replaces the diagnostics sink.
    pub fn set_sink(&self, sink: impl TraceSink + 'static) {
        self.state.borrow_mut().tracer.set_sink(sink);
    }

    /// Installs the callback invoked whenever a flush becomes pending.
    ///
    /// The callback must arrange for [`flush`](Self::flush) to run later; it
    /// must not flush synchronously. Capture a [`WeakScheduler`] rather than
    /// a `Scheduler` to avoid a reference cycle.
    pub fn set_flush_requester(&self, requester: impl Fn() + 'static) {
        self.state.borrow_mut().requester = Some(Rc::new(requester));
    }

    // -- Queue API --

    /// Queues `job` for the next flush, unless it is already queued.
    ///
    /// While flushing, only queue entries at or after the job currently
    /// running count as "already queued". For a job with
    /// [`allow_recurse`](JobOptions::allow_recurse) the running entry itself
    /// does not count either, so a running job can queue itself again.
    ///
    /// Jobs with an id are inserted in id order among the entries not yet
    /// run; jobs without one go to the end.
    pub fn enqueue(&self, job: &Job) {
        {
            let mut st = self.state.borrow_mut();
            let start = if st.flushing && job.options().allow_recurse {
                st.flush_index + 1
            } else {
                st.flush_index
            };
            let queued = st
                .queue
                .get(start..)
                .is_some_and(|rest| rest.iter().any(|j| j.ptr_eq(job)));
            if queued {
                return;
            }
            match job.id() {
                None => st.queue.push(job.clone()),
                Some(id) => {
                    let pos = st.insertion_index(id);
                    st.queue.insert(pos, job.clone());
                }
            }
        }
        self.request_flush();
    }

    /// Queues a callback to run after the main queue of the next flush
    /// drains.
    pub fn enqueue_post_flush(&self, job: &Job) {
        self.state.borrow_mut().pending_post.push(job.clone());
        self.request_flush();
    }

    /// Runs pending post-flush callbacks now.
    ///
    /// Callbacks are deduplicated and run in id order. Called while a batch
    /// is already draining, the new callbacks are appended to that batch
    /// instead.
    pub fn drain_post_flush(&self) {
        let mut guard = RecursionGuard::new(self.config().recursion_limit);
        let mut summary = FlushSummary::default();
        self.drain_post_flush_with(&mut guard, &mut summary);
    }

    /// Returns the number of jobs in the main queue.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Returns whether a flush has been requested but not started.
    #[must_use]
    pub fn is_flush_pending(&self) -> bool {
        self.state.borrow().flush_pending
    }

    /// Returns whether a flush is running.
    #[must_use]
    pub fn is_flushing(&self) -> bool {
        self.state.borrow().flushing
    }

    /// Returns how many flushes have completed.
    #[must_use]
    pub fn completed_flushes(&self) -> u64 {
        self.state.borrow().completed
    }

    // -- Flushing --

    /// Flushes if a flush is pending. Returns whether it flushed.
    pub fn run_pending(&self) -> bool {
        if self.is_flush_pending() {
            self.flush();
            true
        } else {
            false
        }
    }

    /// Runs all queued jobs and post-flush callbacks, repeating until no
    /// work is left. Does nothing if a flush is already running.
    pub fn flush(&self) {
        let flush_index = {
            let mut st = self.state.borrow_mut();
            if st.flushing {
                return;
            }
            st.flush_pending = false;
            st.flushing = true;
            let e = FlushBeginEvent {
                flush_index: st.completed,
                queued: st.queue.len(),
            };
            st.tracer.flush_begin(&e);
            e.flush_index
        };
        let reset = FlushReset(self);

        let mut guard = RecursionGuard::new(self.config().recursion_limit);
        let mut summary = FlushSummary {
            flush_index,
            ..FlushSummary::default()
        };
        loop {
            summary.passes += 1;
            self.run_queue(&mut guard, &mut summary);
            self.drain_post_flush_with(&mut guard, &mut summary);

            let st = self.state.borrow();
            if st.queue.is_empty() && st.pending_post.is_empty() {
                break;
            }
        }
        drop(reset);

        let (wakers, callbacks) = {
            let mut st = self.state.borrow_mut();
            st.flushing = false;
            st.completed += 1;
            st.tracer.flush_end(&summary);
            (
                core::mem::take(&mut st.wakers),
                core::mem::take(&mut st.tick_callbacks),
            )
        };
        for waker in wakers {
            waker.wake();
        }
        for callback in callbacks {
            callback();
        }
    }

    // -- Ticks --

    /// Returns a future that resolves after the pending or running flush
    /// completes, or immediately if the scheduler is idle.
    pub fn next_tick(&self) -> NextTick {
        let st = self.state.borrow();
        let target = if st.flushing || st.flush_pending {
            st.completed + 1
        } else {
            st.completed
        };
        NextTick::new(self.clone(), target)
    }

    /// Runs `callback` after the pending or running flush completes, or
    /// right away if the scheduler is idle.
    pub fn next_tick_then(&self, callback: impl FnOnce() + 'static) {
        {
            let mut st = self.state.borrow_mut();
            if st.flushing || st.flush_pending {
                st.tick_callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    pub(crate) fn register_waker(&self, waker: &Waker) {
        let mut st = self.state.borrow_mut();
        if !st.wakers.iter().any(|w| w.will_wake(waker)) {
            st.wakers.push(waker.clone());
        }
    }

    // -- Internal helpers --

    /// Marks a flush pending and notifies the requester, once per turn.
    fn request_flush(&self) {
        let requester = {
            let mut st = self.state.borrow_mut();
            if st.flushing || st.flush_pending {
                return;
            }
            st.flush_pending = true;
            st.requester.clone()
        };
        if let Some(requester) = requester {
            requester();
        }
    }

    /// One pass over the main queue.
    fn run_queue(&self, guard: &mut RecursionGuard, summary: &mut FlushSummary) {
        self.state.borrow_mut().queue.sort_by(flush_order);

        let mut i = 0;
        loop {
            let job = {
                let mut st = self.state.borrow_mut();
                let Some(job) = st.queue.get(i).cloned() else {
                    break;
                };
                st.flush_index = i;
                job
            };
            if job.is_active() {
                self.run_guarded(&job, guard, summary);
            } else {
                summary.jobs_skipped += 1;
            }
            i += 1;
        }

        let mut st = self.state.borrow_mut();
        st.flush_index = 0;
        st.queue.clear();
    }

    fn drain_post_flush_with(&self, guard: &mut RecursionGuard, summary: &mut FlushSummary) {
        {
            let mut st = self.state.borrow_mut();
            if st.pending_post.is_empty() {
                return;
            }
            let mut batch: Vec<Job> = Vec::new();
            for job in core::mem::take(&mut st.pending_post) {
                if !batch.iter().any(|j| j.ptr_eq(&job)) {
                    batch.push(job);
                }
            }
            if let Some(active) = &mut st.active_post {
                active.extend(batch);
                return;
            }
            batch.sort_by_key(Job::sort_key);
            st.active_post = Some(batch);
            st.post_index = 0;
        }

        loop {
            let job = {
                let st = self.state.borrow();
                let next = st
                    .active_post
                    .as_ref()
                    .and_then(|batch| batch.get(st.post_index));
                match next {
                    Some(job) => job.clone(),
                    None => break,
                }
            };
            if self.run_guarded(&job, guard, summary) {
                summary.post_flush_run += 1;
            }
            self.state.borrow_mut().post_index += 1;
        }

        let mut st = self.state.borrow_mut();
        st.active_post = None;
        st.post_index = 0;
    }

    /// Runs `job` if the guard allows it, reporting failures. Returns whether
    /// the body ran.
    fn run_guarded(&self, job: &Job, guard: &mut RecursionGuard, summary: &mut FlushSummary) -> bool {
        match guard.check(job) {
            Verdict::Run => {
                summary.jobs_run += 1;
                if let Err(error) = job.run() {
                    summary.jobs_failed += 1;
                    self.warn(&Warning::JobFailed {
                        owner: job.owner().map(ToString::to_string),
                        error,
                    });
                }
                true
            }
            Verdict::Suppress { first } => {
                summary.jobs_suppressed += 1;
                if first {
                    self.warn(&Warning::RecursionLimit {
                        owner: job.owner().map(ToString::to_string),
                        limit: guard.limit(),
                    });
                }
                false
            }
        }
    }

    fn warn(&self, w: &Warning) {
        self.state.borrow_mut().tracer.warning(w);
    }
}

impl State {
    /// Binary search over the not-yet-run part of the queue.
    fn insertion_index(&self, id: u64) -> usize {
        let start = if self.flushing {
            (self.flush_index + 1).min(self.queue.len())
        } else {
            0
        };
        start + self.queue[start..].partition_point(|j| j.sort_key() < id)
    }
}

/// Restores an idle state when a flush ends, including by a panicking job.
struct FlushReset<'a>(&'a Scheduler);

impl Drop for FlushReset<'_> {
    fn drop(&mut self) {
        if let Ok(mut st) = self.0.state.try_borrow_mut() {
            st.flushing = false;
            st.flush_index = 0;
            st.queue.clear();
            st.active_post = None;
            st.post_index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};

    use super::*;

    /// Collects warnings as display strings.
    #[derive(Default)]
    struct Warnings(Vec<String>);

    impl TraceSink for Warnings {
        fn on_warning(&mut self, w: &Warning) {
            self.0.push(w.to_string());
        }
    }

    fn recording_job(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, options: JobOptions) -> Job {
        let log = Rc::clone(log);
        Job::with_options(options, move || {
            log.borrow_mut().push(name);
            Ok(())
        })
    }

    fn with_id(id: u64) -> JobOptions {
        JobOptions {
            id: Some(id),
            ..JobOptions::default()
        }
    }

    #[test]
    fn duplicate_enqueue_runs_once() {
        let scheduler = Scheduler::default();
        let runs = Rc::new(Cell::new(0));
        let job = {
            let runs = Rc::clone(&runs);
            Job::from_fn(move || runs.set(runs.get() + 1))
        };
        scheduler.enqueue(&job);
        scheduler.enqueue(&job.clone());
        assert_eq!(scheduler.queued_len(), 1);
        assert!(scheduler.run_pending());
        assert_eq!(runs.get(), 1);
        assert!(!scheduler.run_pending());
    }

    #[test]
    fn requests_one_flush_per_turn() {
        let scheduler = Scheduler::default();
        let requests = Rc::new(Cell::new(0));
        {
            let requests = Rc::clone(&requests);
            scheduler.set_flush_requester(move || requests.set(requests.get() + 1));
        }
        for _ in 0..3 {
            scheduler.enqueue(&Job::from_fn(|| {}));
        }
        assert_eq!(requests.get(), 1);
        assert!(scheduler.is_flush_pending());
        scheduler.flush();
        scheduler.enqueue(&Job::from_fn(|| {}));
        assert_eq!(requests.get(), 2);
    }

    #[test]
    fn runs_in_id_order_with_pre_first() {
        let scheduler = Scheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let unnumbered = recording_job(&log, "none", JobOptions::default());
        let two = recording_job(&log, "two", with_id(2));
        let one = recording_job(&log, "one", with_id(1));
        let one_pre = recording_job(
            &log,
            "one-pre",
            JobOptions {
                pre: true,
                ..with_id(1)
            },
        );
        for job in [&unnumbered, &two, &one, &one_pre] {
            scheduler.enqueue(job);
        }
        scheduler.flush();
        assert_eq!(*log.borrow(), ["one-pre", "one", "two", "none"]);
    }

    #[test]
    fn inactive_jobs_are_skipped_but_kept_runnable() {
        let scheduler = Scheduler::default();
        let runs = Rc::new(Cell::new(0));
        let job = {
            let runs = Rc::clone(&runs);
            Job::from_fn(move || runs.set(runs.get() + 1))
        };
        scheduler.enqueue(&job);
        job.set_active(false);
        scheduler.flush();
        assert_eq!(runs.get(), 0);

        job.set_active(true);
        scheduler.enqueue(&job);
        scheduler.flush();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn failing_job_does_not_abort_the_pass() {
        let scheduler = Scheduler::default();
        let warnings = Rc::new(RefCell::new(Warnings::default()));
        scheduler.set_sink(Rc::clone(&warnings));
        let log = Rc::new(RefCell::new(Vec::new()));
        let failing = Job::with_options(
            JobOptions {
                owner: Some("Broken".into()),
                ..with_id(0)
            },
            || Err(JobError::message("boom")),
        );
        scheduler.enqueue(&failing);
        scheduler.enqueue(&recording_job(&log, "after", with_id(1)));
        scheduler.flush();
        assert_eq!(*log.borrow(), ["after"]);
        assert_eq!(warnings.borrow().0, ["job in <Broken> failed: boom"]);
    }

    #[test]
    fn self_requeue_without_allow_recurse_runs_once() {
        let scheduler = Scheduler::default();
        let runs = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Job>>> = Rc::new(RefCell::new(None));
        let job = {
            let (scheduler, runs, slot) = (scheduler.clone(), Rc::clone(&runs), Rc::clone(&slot));
            Job::from_fn(move || {
                runs.set(runs.get() + 1);
                if let Some(me) = slot.borrow().as_ref() {
                    scheduler.enqueue(me);
                }
            })
        };
        *slot.borrow_mut() = Some(job.clone());
        scheduler.enqueue(&job);
        scheduler.flush();
        assert_eq!(runs.get(), 1);
        slot.borrow_mut().take();
    }

    #[test]
    fn runaway_job_is_bounded_by_the_limit() {
        let scheduler = Scheduler::default();
        let warnings = Rc::new(RefCell::new(Warnings::default()));
        scheduler.set_sink(Rc::clone(&warnings));
        let runs = Rc::new(Cell::new(0_u32));
        let slot: Rc<RefCell<Option<Job>>> = Rc::new(RefCell::new(None));
        let job = {
            let (scheduler, runs, slot) = (scheduler.clone(), Rc::clone(&runs), Rc::clone(&slot));
            Job::with_options(
                JobOptions {
                    allow_recurse: true,
                    owner: Some("Loop".into()),
                    ..JobOptions::default()
                },
                move || {
                    runs.set(runs.get() + 1);
                    if let Some(me) = slot.borrow().as_ref() {
                        scheduler.enqueue(me);
                    }
                    Ok(())
                },
            )
        };
        *slot.borrow_mut() = Some(job.clone());
        scheduler.enqueue(&job);
        scheduler.flush();

        assert_eq!(runs.get(), 100);
        assert_eq!(warnings.borrow().0.len(), 1);
        assert!(warnings.borrow().0[0].contains("<Loop>"));
        assert!(!scheduler.is_flushing());
        assert_eq!(scheduler.queued_len(), 0);
        slot.borrow_mut().take();
    }

    #[test]
    fn limit_is_configurable() {
        let scheduler = Scheduler::new(SchedulerConfig { recursion_limit: 3 });
        let runs = Rc::new(Cell::new(0_u32));
        let slot: Rc<RefCell<Option<Job>>> = Rc::new(RefCell::new(None));
        let job = {
            let (scheduler, runs, slot) = (scheduler.clone(), Rc::clone(&runs), Rc::clone(&slot));
            Job::with_options(
                JobOptions {
                    allow_recurse: true,
                    ..JobOptions::default()
                },
                move || {
                    runs.set(runs.get() + 1);
                    if let Some(me) = slot.borrow().as_ref() {
                        scheduler.enqueue(me);
                    }
                    Ok(())
                },
            )
        };
        *slot.borrow_mut() = Some(job.clone());
        scheduler.enqueue(&job);
        scheduler.flush();
        assert_eq!(runs.get(), 3);
        slot.borrow_mut().take();
    }

    #[test]
    fn jobs_queued_during_flush_run_in_the_same_flush() {
        let scheduler = Scheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let late = recording_job(&log, "late", with_id(5));
        let early = {
            let (scheduler, log, late) = (scheduler.clone(), Rc::clone(&log), late.clone());
            Job::with_options(with_id(1), move || {
                log.borrow_mut().push("early");
                scheduler.enqueue(&late);
                Ok(())
            })
        };
        let middle = recording_job(&log, "middle", with_id(3));
        scheduler.enqueue(&early);
        scheduler.enqueue(&middle);
        scheduler.flush();
        assert_eq!(*log.borrow(), ["early", "middle", "late"]);
        assert_eq!(scheduler.completed_flushes(), 1);
    }

    #[test]
    fn post_flush_callbacks_run_after_jobs_deduplicated_and_sorted() {
        let scheduler = Scheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let post_b = recording_job(&log, "post-b", with_id(2));
        let post_a = recording_job(&log, "post-a", with_id(1));
        let job = {
            let (scheduler, log) = (scheduler.clone(), Rc::clone(&log));
            let (post_a, post_b) = (post_a.clone(), post_b.clone());
            Job::from_fn(move || {
                log.borrow_mut().push("job");
                scheduler.enqueue_post_flush(&post_b);
                scheduler.enqueue_post_flush(&post_a);
                scheduler.enqueue_post_flush(&post_b);
            })
        };
        scheduler.enqueue(&job);
        scheduler.flush();
        assert_eq!(*log.borrow(), ["job", "post-a", "post-b"]);
    }

    #[test]
    fn post_flush_callback_can_queue_more_work() {
        let scheduler = Scheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let follow_up = recording_job(&log, "follow-up", JobOptions::default());
        let post = {
            let (scheduler, log, follow_up) = (scheduler.clone(), Rc::clone(&log), follow_up.clone());
            Job::from_fn(move || {
                log.borrow_mut().push("post");
                scheduler.enqueue(&follow_up);
            })
        };
        scheduler.enqueue_post_flush(&post);
        scheduler.flush();
        assert_eq!(*log.borrow(), ["post", "follow-up"]);
        assert_eq!(scheduler.completed_flushes(), 1);
    }

    #[test]
    fn nested_drain_appends_to_active_batch() {
        let scheduler = Scheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let extra = recording_job(&log, "extra", with_id(0));
        let first = {
            let (scheduler, log, extra) = (scheduler.clone(), Rc::clone(&log), extra.clone());
            Job::with_options(with_id(1), move || {
                log.borrow_mut().push("first");
                scheduler.enqueue_post_flush(&extra);
                scheduler.drain_post_flush();
                Ok(())
            })
        };
        let second = recording_job(&log, "second", with_id(2));
        scheduler.enqueue_post_flush(&first);
        scheduler.enqueue_post_flush(&second);
        scheduler.drain_post_flush();
        // `extra` joins the running batch after `second` instead of running
        // inside `first`.
        assert_eq!(*log.borrow(), ["first", "second", "extra"]);
    }

    #[test]
    fn next_tick_resolves_after_flush() {
        let scheduler = Scheduler::default();
        let mut cx = Context::from_waker(Waker::noop());

        let idle = pin!(scheduler.next_tick());
        assert_eq!(idle.poll(&mut cx), Poll::Ready(()));

        scheduler.enqueue(&Job::from_fn(|| {}));
        let mut pending = pin!(scheduler.next_tick());
        assert_eq!(pending.as_mut().poll(&mut cx), Poll::Pending);
        scheduler.flush();
        assert_eq!(pending.as_mut().poll(&mut cx), Poll::Ready(()));
    }

    #[test]
    fn next_tick_then_waits_for_pending_flush() {
        let scheduler = Scheduler::default();
        let fired = Rc::new(Cell::new(false));

        scheduler.enqueue(&Job::from_fn(|| {}));
        {
            let fired = Rc::clone(&fired);
            scheduler.next_tick_then(move || fired.set(true));
        }
        assert!(!fired.get());
        scheduler.flush();
        assert!(fired.get());

        let immediate = Rc::new(Cell::new(false));
        {
            let immediate = Rc::clone(&immediate);
            scheduler.next_tick_then(move || immediate.set(true));
        }
        assert!(immediate.get());
    }

    #[test]
    fn flush_from_inside_a_job_is_ignored() {
        let scheduler = Scheduler::default();
        let runs = Rc::new(Cell::new(0));
        let job = {
            let (scheduler, runs) = (scheduler.clone(), Rc::clone(&runs));
            Job::from_fn(move || {
                runs.set(runs.get() + 1);
                scheduler.flush();
            })
        };
        scheduler.enqueue(&job);
        scheduler.flush();
        assert_eq!(runs.get(), 1);
        assert_eq!(scheduler.completed_flushes(), 1);
    }

    #[test]
    fn weak_handle_does_not_keep_scheduler_alive() {
        let scheduler = Scheduler::default();
        let weak = scheduler.downgrade();
        assert!(weak.upgrade().is_some());
        drop(scheduler);
        assert!(weak.upgrade().is_none());
    }
}
