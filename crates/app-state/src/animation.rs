//! Frame clock for in-flight transitions
//!
//! The [`AnimationDriver`] spawns a task that ticks at a fixed frame interval
//! and advances a [`FrameTarget`] until the target reports it has finished.
//! Only one run exists at a time: starting a new run aborts the previous
//! one, so a navigation issued mid-animation never queues behind it.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default frame interval (~60 fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Outcome of advancing a target by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// More frames are needed
    Running,
    /// Nothing left to animate
    Finished,
}

/// Something that can be advanced frame by frame
#[cfg_attr(test, mockall::automock)]
pub trait FrameTarget: Send {
    /// Advance by `elapsed` since the previous frame
    fn on_frame(&mut self, elapsed: Duration) -> FrameStatus;
}

/// Identifier of one driver run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

struct ActiveRun {
    id: RunId,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

/// Drives frame targets on a tokio task, last request wins
pub struct AnimationDriver {
    frame_interval: Duration,
    next_run: u64,
    active: Option<ActiveRun>,
}

impl AnimationDriver {
    /// Create a driver ticking every `frame_interval`
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            next_run: 0,
            active: None,
        }
    }

    /// Frame interval used by new runs
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Start advancing `target`, aborting any run still in progress
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<T>(&mut self, target: Arc<Mutex<T>>) -> RunId
    where
        T: FrameTarget + 'static,
    {
        if self.cancel() {
            tracing::debug!("animation run superseded by a new request");
        }

        self.next_run += 1;
        let id = RunId(self.next_run);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let running = Arc::new(AtomicBool::new(true));
        let running_flag = Arc::clone(&running);
        let frame_interval = self.frame_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            let mut last = Instant::now();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = Instant::now();
                        let elapsed = now.duration_since(last);
                        last = now;

                        let status = target.lock().on_frame(elapsed);
                        tracing::trace!(run = id.0, ?elapsed, ?status, "frame");
                        if status == FrameStatus::Finished {
                            break;
                        }
                    }
                    _ = &mut stop_rx => {
                        break;
                    }
                }
            }

            running_flag.store(false, Ordering::SeqCst);
        });

        self.active = Some(ActiveRun {
            id,
            stop_tx: Some(stop_tx),
            handle,
            running,
        });
        id
    }

    /// Stop the current run where it is
    ///
    /// Returns `true` if a run was still in progress.
    pub fn cancel(&mut self) -> bool {
        let Some(mut run) = self.active.take() else {
            return false;
        };
        let was_running = run.running.swap(false, Ordering::SeqCst);
        if let Some(tx) = run.stop_tx.take() {
            let _ = tx.send(());
        }
        run.handle.abort();
        if was_running {
            tracing::debug!(run = run.id.0, "animation run cancelled");
        }
        was_running
    }

    /// Check whether a run is still advancing its target
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map(|run| run.running.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Identifier of the latest run, if any
    pub fn current_run(&self) -> Option<RunId> {
        self.active.as_ref().map(|run| run.id)
    }

    /// Wait for the current run to finish on its own
    pub async fn join(&mut self) {
        if let Some(run) = self.active.as_mut() {
            let _ = (&mut run.handle).await;
            run.running.store(false, Ordering::SeqCst);
        }
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
