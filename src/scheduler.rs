//! Host scheduling - animation frames, timers and microtasks.
//!
//! The list runtime defers exactly two things:
//! - scroll recomputes in a virtual list, coalesced onto the next frame
//! - delegated listener setup, queued as a microtask
//!
//! Both go through the [`Scheduler`] trait so a browser binding can forward
//! to `requestAnimationFrame` / `setTimeout` / `queueMicrotask`, while tests
//! drive a [`ManualScheduler`] by hand.
//!
//! # Example
//!
//! ```ignore
//! use spark_dom::scheduler::{ManualScheduler, Scheduler};
//!
//! let scheduler = ManualScheduler::new();
//! scheduler.next_frame(Box::new(|| println!("frame")));
//! scheduler.run_frame(); // prints "frame"
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

/// Deferred callback.
pub type Task = Box<dyn FnOnce()>;

/// Timer fallback used when the host has no animation frames (~60Hz).
pub const FRAME_FALLBACK: Duration = Duration::from_millis(16);

/// Handle to a pending frame or timer callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

// =============================================================================
// Trait
// =============================================================================

pub trait Scheduler {
    /// Run `task` before the next paint.
    ///
    /// Hosts without animation frames hand the task back unchanged.
    fn request_frame(&self, task: Task) -> Result<TaskId, Task>;

    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId;

    /// Cancel a pending frame or timer. Unknown or already-run ids are ignored.
    fn cancel(&self, id: TaskId);

    fn queue_microtask(&self, task: Task);

    /// Next frame if the host has frames, otherwise a [`FRAME_FALLBACK`] timer.
    fn next_frame(&self, task: Task) -> TaskId {
        match self.request_frame(task) {
            Ok(id) => id,
            Err(task) => self.set_timeout(FRAME_FALLBACK, task),
        }
    }
}

// =============================================================================
// Manual Scheduler
// =============================================================================

struct Timer {
    id: TaskId,
    due: Duration,
    task: Task,
}

/// Deterministic scheduler driven by the host (or a test).
///
/// Nothing runs until one of [`run_frame`](Self::run_frame),
/// [`advance`](Self::advance) or [`run_microtasks`](Self::run_microtasks)
/// is called.
pub struct ManualScheduler {
    frames_enabled: bool,
    next_id: Cell<u64>,
    now: Cell<Duration>,
    frames: RefCell<Vec<(TaskId, Task)>>,
    timers: RefCell<Vec<Timer>>,
    microtasks: RefCell<VecDeque<Task>>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            frames_enabled: true,
            next_id: Cell::new(0),
            now: Cell::new(Duration::ZERO),
            frames: RefCell::new(Vec::new()),
            timers: RefCell::new(Vec::new()),
            microtasks: RefCell::new(VecDeque::new()),
        }
    }

    /// A host with no animation frames; frame requests fall back to timers.
    pub fn without_frames() -> Self {
        Self {
            frames_enabled: false,
            ..Self::new()
        }
    }

    /// Run every frame callback requested before this call.
    ///
    /// Callbacks requested while the frame runs wait for the next one.
    /// Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let frame = std::mem::take(&mut *self.frames.borrow_mut());
        let count = frame.len();
        for (_, task) in frame {
            task();
        }
        trace!(count, "frame ran");
        count
    }

    /// Move the clock forward and run every timer that came due, in order.
    pub fn advance(&self, by: Duration) -> usize {
        self.now.set(self.now.get() + by);
        let mut count = 0;
        while let Some(task) = self.pop_due_timer() {
            task();
            count += 1;
        }
        count
    }

    /// Drain the microtask queue, including microtasks queued while draining.
    pub fn run_microtasks(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.microtasks.borrow_mut().pop_front();
            let Some(task) = next else { break };
            task();
            count += 1;
        }
        count
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_microtasks(&self) -> usize {
        self.microtasks.borrow().len()
    }

    fn allocate_id(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TaskId(id)
    }

    fn pop_due_timer(&self) -> Option<Task> {
        let mut timers = self.timers.borrow_mut();
        let now = self.now.get();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        Some(timers.remove(index).task)
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&self, task: Task) -> Result<TaskId, Task> {
        if !self.frames_enabled {
            return Err(task);
        }
        let id = self.allocate_id();
        self.frames.borrow_mut().push((id, task));
        Ok(id)
    }

    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId {
        let id = self.allocate_id();
        let due = self.now.get() + delay;
        self.timers.borrow_mut().push(Timer { id, due, task });
        id
    }

    fn cancel(&self, id: TaskId) {
        self.frames.borrow_mut().retain(|(frame_id, _)| *frame_id != id);
        self.timers.borrow_mut().retain(|timer| timer.id != id);
    }

    fn queue_microtask(&self, task: Task) {
        self.microtasks.borrow_mut().push_back(task);
    }
}
