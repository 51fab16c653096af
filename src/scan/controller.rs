use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::{
    analysis::{generate, seed_for_upload, AnalysisInput, AnalysisRequest, AnalysisResult},
    session::ResultSlot,
};

use super::{
    events::{ScanEvent, ScanEventSink},
    scheduler::{Scheduler, TimerHandle},
    state::{ProgressState, ScanPhase},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Smallest and largest progress increment per tick, in percent.
pub const MIN_STEP: f64 = 2.0;
pub const MAX_STEP: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTiming {
    pub tick_interval: Duration,
    pub settle_delay: Duration,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(120),
            settle_delay: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Scan this snapshot belongs to; matches the `generation` on events.
    pub generation: u64,
    pub phase: ScanPhase,
    pub running: bool,
    pub percent: f64,
}

/// What a scan captured when it was submitted.
struct ScanJob {
    input: AnalysisInput,
    image_snapshot: Option<String>,
}

struct ScanInner {
    progress: ProgressState,
    job: Option<ScanJob>,
    /// The single live timer: a tick while running, the settle delay while
    /// settling, nothing otherwise.
    timer: Option<TimerHandle>,
    /// Bumped on every start and reset. Callbacks carry the generation they
    /// were scheduled for and do nothing once it is stale.
    generation: u64,
    rng: StdRng,
}

impl ScanInner {
    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            generation: self.generation,
            phase: self.progress.phase,
            running: self.progress.is_active(),
            percent: self.progress.percent,
        }
    }
}

struct Shared {
    inner: Mutex<ScanInner>,
    scheduler: Arc<dyn Scheduler>,
    results: ResultSlot,
    events: Arc<dyn ScanEventSink>,
    timing: ScanTiming,
}

/// Drives the simulated scan: `Idle -> Running -> Settling -> Done`, with
/// `reset` returning to `Idle` from anywhere.
#[derive(Clone)]
pub struct ScanController {
    shared: Arc<Shared>,
}

impl ScanController {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        results: ResultSlot,
        events: Arc<dyn ScanEventSink>,
        timing: ScanTiming,
    ) -> Self {
        Self::with_rng(scheduler, results, events, timing, StdRng::from_entropy())
    }

    /// Like [`ScanController::new`] with a caller-supplied RNG for the
    /// progress increments. The analysis itself never uses it.
    pub fn with_rng(
        scheduler: Arc<dyn Scheduler>,
        results: ResultSlot,
        events: Arc<dyn ScanEventSink>,
        timing: ScanTiming,
        rng: StdRng,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(ScanInner {
                    progress: ProgressState::new(),
                    job: None,
                    timer: None,
                    generation: 0,
                    rng,
                }),
                scheduler,
                results,
                events,
                timing,
            }),
        }
    }

    /// Starts a scan for `request`, cancelling any scan still in flight.
    ///
    /// The preview image is not built here; hand it over with
    /// [`ScanController::attach_snapshot`] once it is ready.
    pub fn start(&self, request: AnalysisRequest) -> ProgressSnapshot {
        let input = AnalysisInput {
            seed: seed_for_upload(&request.image),
            category: request.category,
            crop_kind: request.effective_crop_kind(),
        };

        let category = input.category;
        let (generation, snapshot) = {
            let mut inner = self.shared.lock();
            if let Some(timer) = inner.timer.take() {
                log_debug!("cancelling scan {} for a new submission", inner.generation);
                timer.cancel();
            }

            inner.generation += 1;
            let generation = inner.generation;
            inner.progress.begin();
            inner.job = Some(ScanJob {
                input,
                image_snapshot: None,
            });
            inner.timer = Some(self.shared.schedule_tick(generation));

            (generation, inner.snapshot())
        };

        self.shared.events.emit(ScanEvent::Started {
            generation,
            category,
        });
        snapshot
    }

    /// Cancels whatever is pending and returns to `Idle`. A result already
    /// deposited in the handoff slot is left for the results view.
    pub fn reset(&self) -> ProgressSnapshot {
        let (generation, snapshot) = {
            let mut inner = self.shared.lock();
            if let Some(timer) = inner.timer.take() {
                timer.cancel();
            }
            inner.job = None;
            inner.progress.reset();
            inner.generation += 1;
            (inner.generation, inner.snapshot())
        };

        self.shared.events.emit(ScanEvent::Reset { generation });
        snapshot
    }

    /// Stores the preview for scan `generation` so it lands in the result.
    /// Returns false, dropping the preview, when that scan was reset,
    /// replaced or has already finished.
    pub fn attach_snapshot(&self, generation: u64, image_snapshot: String) -> bool {
        let mut inner = self.shared.lock();
        if inner.generation != generation {
            log_debug!("dropping preview for stale scan {generation}");
            return false;
        }
        match inner.job.as_mut() {
            Some(job) => {
                job.image_snapshot = Some(image_snapshot);
                true
            }
            None => {
                log_debug!("scan {generation} finished before its preview was ready");
                false
            }
        }
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn has_live_timer(&self) -> bool {
        self.shared.lock().timer.is_some()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ScanInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn schedule_tick(self: &Arc<Self>, generation: u64) -> TimerHandle {
        let shared = Arc::downgrade(self);
        self.scheduler.schedule_after(
            self.timing.tick_interval,
            Box::new(move || with_shared(&shared, |shared| shared.on_tick(generation))),
        )
    }

    fn schedule_settle(self: &Arc<Self>, generation: u64) -> TimerHandle {
        let shared = Arc::downgrade(self);
        self.scheduler.schedule_after(
            self.timing.settle_delay,
            Box::new(move || with_shared(&shared, |shared| shared.on_settled(generation))),
        )
    }

    fn on_tick(self: &Arc<Self>, generation: u64) {
        let events = {
            let mut inner = self.lock();
            if inner.generation != generation || inner.progress.phase != ScanPhase::Running {
                return;
            }
            // This tick's own handle has fired; drop it before arming the next.
            inner.timer = None;

            let step = inner.rng.gen_range(MIN_STEP..=MAX_STEP);
            let reached_end = inner.progress.advance(step);
            let mut events = vec![ScanEvent::Progress {
                generation,
                percent: inner.progress.percent,
            }];

            if reached_end {
                inner.timer = Some(self.schedule_settle(generation));
                events.push(ScanEvent::Settling { generation });
            } else {
                inner.timer = Some(self.schedule_tick(generation));
            }
            events
        };

        for event in events {
            self.events.emit(event);
        }
    }

    fn on_settled(&self, generation: u64) {
        let result = {
            let mut inner = self.lock();
            if inner.generation != generation || inner.progress.phase != ScanPhase::Settling {
                return;
            }
            inner.timer = None;

            let Some(job) = inner.job.take() else {
                log_warn!("scan {generation} settled without a captured job");
                inner.progress.reset();
                return;
            };

            inner.progress.finish();
            let result = generate(&job.input, job.image_snapshot);
            // Deposit under the lock so a concurrent reset cannot slip in
            // between finishing and publishing.
            self.results.put(result.clone());
            result
        };

        self.events.emit(completed_event(generation, &result));
    }
}

fn with_shared(shared: &Weak<Shared>, f: impl FnOnce(&Arc<Shared>)) {
    if let Some(shared) = shared.upgrade() {
        f(&shared);
    }
}

fn completed_event(generation: u64, result: &AnalysisResult) -> ScanEvent {
    ScanEvent::Completed {
        generation,
        status: result.status,
        confidence: result.confidence,
    }
}
