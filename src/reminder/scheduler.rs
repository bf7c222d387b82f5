//! Background reminder timer.
//!
//! ## States
//!
//! ```text
//! start(Disabled) ─────────────────────▶ Stopped
//! start(Once | Every) ──▶ Running ──shutdown()──▶ Stopped
//!                           │
//!                           └─ Once: after its single tick ─▶ Stopped
//! ```
//!
//! A scheduler is single-use. After `shutdown()` build a new one for the next
//! policy generation.
//!
//! ## Cancellation
//!
//! Every enqueue happens while holding the state mutex and only if the state
//! is still `Running`. `shutdown()` flips the state under the same mutex, so
//! once it returns no further tick can reach the host queue.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::ReminderInterval;

/// Delay before the first reminder pass.
pub const INITIAL_DELAY: Duration = Duration::from_millis(200);

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Timer active.
    Running,
    /// Timer cancelled, finished, or never started.
    Stopped,
}

/// Signal that a reminder pass is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTick {
    /// Scheduler generation that produced the tick.
    pub generation: u64,
    /// Zero-based firing count within that generation.
    pub sequence: u64,
}

/// The host's serialized task queue.
///
/// `enqueue` must not block; it is called from the timer task.
pub trait TaskQueue: Send + Sync + 'static {
    /// Hand a tick to the host's main loop. Fire-and-forget.
    fn enqueue(&self, tick: ReminderTick);
}

impl TaskQueue for mpsc::UnboundedSender<ReminderTick> {
    fn enqueue(&self, tick: ReminderTick) {
        if self.send(tick).is_err() {
            debug!(generation = tick.generation, "Host task queue closed, dropping reminder tick");
        }
    }
}

/// Recurring reminder timer for one policy generation.
#[derive(Debug)]
pub struct ReminderScheduler {
    generation: u64,
    interval: ReminderInterval,
    state: Arc<Mutex<SchedulerState>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReminderScheduler {
    /// Start a scheduler on the given runtime.
    ///
    /// A disabled interval yields a scheduler that is `Stopped` from the start.
    pub fn start<Q: TaskQueue>(
        generation: u64,
        interval: ReminderInterval,
        queue: Q,
        runtime: &Handle,
    ) -> Self {
        if !interval.is_enabled() {
            info!(generation = generation, "Reminder scheduler disabled");
            return Self::stopped(generation, interval);
        }

        let state = Arc::new(Mutex::new(SchedulerState::Running));
        let first = Instant::now() + INITIAL_DELAY;
        let task = runtime.spawn(run_timer(generation, interval, first, queue, Arc::clone(&state)));

        info!(
            generation = generation,
            interval = %interval,
            initial_delay_ms = INITIAL_DELAY.as_millis() as u64,
            "Reminder scheduler started"
        );

        Self {
            generation,
            interval,
            state,
            task: Mutex::new(Some(task)),
        }
    }

    /// A scheduler that never fires.
    pub fn stopped(generation: u64, interval: ReminderInterval) -> Self {
        Self {
            generation,
            interval,
            state: Arc::new(Mutex::new(SchedulerState::Stopped)),
            task: Mutex::new(None),
        }
    }

    /// Cancel all pending and future ticks. Idempotent.
    pub fn shutdown(&self) {
        let was_running = {
            let mut state = self.state.lock();
            let was_running = *state == SchedulerState::Running;
            *state = SchedulerState::Stopped;
            was_running
        };

        if let Some(task) = self.task.lock().take() {
            task.abort();
        }

        if was_running {
            info!(generation = self.generation, "Reminder scheduler stopped");
        }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// Generation stamped on every tick.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Interval this scheduler was started with.
    pub fn interval(&self) -> ReminderInterval {
        self.interval
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Enqueue one tick if still running.
fn fire<Q: TaskQueue>(queue: &Q, state: &Mutex<SchedulerState>, tick: ReminderTick) -> bool {
    let state = state.lock();
    if *state != SchedulerState::Running {
        return false;
    }
    debug!(generation = tick.generation, sequence = tick.sequence, "Reminder tick");
    queue.enqueue(tick);
    true
}

/// `first` is the deadline taken in `start`, independent of when the task is first polled.
async fn run_timer<Q: TaskQueue>(
    generation: u64,
    interval: ReminderInterval,
    first: Instant,
    queue: Q,
    state: Arc<Mutex<SchedulerState>>,
) {
    match interval.period() {
        Some(period) => {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut sequence = 0;
            loop {
                ticker.tick().await;
                if !fire(&queue, &state, ReminderTick { generation, sequence }) {
                    break;
                }
                sequence += 1;
            }
        }
        None => {
            sleep_until(first).await;
            fire(&queue, &state, ReminderTick { generation, sequence: 0 });
            *state.lock() = SchedulerState::Stopped;
        }
    }
}
