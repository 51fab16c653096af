//! One-shot timers behind a trait so the scan state machine can run on Tokio
//! in the app and on a hand-driven clock in tests.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::{Context, Result};
use tokio::{runtime::Handle, time};
use tokio_util::sync::CancellationToken;

pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Cancels a scheduled task. Dropping the handle does NOT cancel; the owner
/// must call [`TimerHandle::cancel`] explicitly.
pub struct TimerHandle {
    canceller: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            canceller: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.canceller.is_some())
            .finish()
    }
}

pub trait Scheduler: Send + Sync {
    /// Runs `task` once after `delay` unless the returned handle is cancelled
    /// first.
    fn schedule_after(&self, delay: Duration, task: ScheduledTask) -> TimerHandle;
}

pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    pub fn current() -> Result<Self> {
        let runtime = Handle::try_current().context("scan scheduler needs a running Tokio runtime")?;
        Ok(Self::new(runtime))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let token = CancellationToken::new();
        let child = token.clone();
        // Deadline is fixed now, not when the spawned task is first polled.
        let sleep = {
            let _runtime = self.runtime.enter();
            time::sleep(delay)
        };

        self.runtime.spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = sleep => task(),
            }
        });

        TimerHandle::new(move || token.cancel())
    }
}

struct PendingTask {
    id: u64,
    due: Duration,
    task: ScheduledTask,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTask>,
}

/// Virtual clock. Nothing runs until [`ManualScheduler::advance`] or
/// [`ManualScheduler::run_until_idle`] is called; tasks due at the same
/// instant run in scheduling order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.lock().now
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Moves the clock forward by `by`, running every task that falls due,
    /// including ones scheduled by tasks run during this call.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(Some(target)) {
            task();
            ran += 1;
        }
        self.lock().now = target;
        ran
    }

    /// Runs tasks in due order until none are left or `max_tasks` ran.
    pub fn run_until_idle(&self, max_tasks: usize) -> usize {
        let mut ran = 0;
        while ran < max_tasks {
            match self.pop_due(None) {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    fn pop_due(&self, limit: Option<Duration>) -> Option<ScheduledTask> {
        let mut clock = self.lock();
        let index = clock
            .pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| limit.map_or(true, |limit| pending.due <= limit))
            .min_by_key(|(_, pending)| (pending.due, pending.id))
            .map(|(index, _)| index)?;

        let next = clock.pending.remove(index);
        clock.now = clock.now.max(next.due);
        Some(next.task)
    }

    fn lock(&self) -> MutexGuard<'_, ManualClock> {
        match self.clock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let id = {
            let mut clock = self.lock();
            let id = clock.next_id;
            clock.next_id += 1;
            let due = clock.now + delay;
            clock.pending.push(PendingTask { id, due, task });
            id
        };

        let clock = Arc::clone(&self.clock);
        TimerHandle::new(move || {
            let mut clock = match clock.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            clock.pending.retain(|pending| pending.id != id);
        })
    }
}
