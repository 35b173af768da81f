use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::error::{AppError, Result};
use crate::utils::time::{Clock, SystemClock};

// Tokio timers have millisecond resolution; a shorter slice would spin.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Proof of admission. Carries no resources; dropping it does not return capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permit {
    /// Start of the window this permit was counted against.
    pub window_start: Instant,
    pub granted_at: Instant,
    /// 1-based position of this permit within its window.
    pub sequence: u32,
}

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Fixed-window request gate: at most `limit` permits per `window`.
///
/// A window opens at the first evaluation that finds the previous one fully
/// elapsed, so up to `limit` permits can be issued back-to-back on each side
/// of a window boundary. Callers that find the window full sleep for a tenth
/// of the window and re-check; the lock is never held while sleeping.
#[derive(Debug)]
pub struct RateGate<C: Clock = SystemClock> {
    state: Mutex<WindowState>,
    limit: u32,
    window: Duration,
    poll_interval: Duration,
    clock: C,
}

impl RateGate<SystemClock> {
    pub fn new(limit: u32, window: Duration) -> Result<Self> {
        Self::with_clock(limit, window, SystemClock)
    }
}

impl<C: Clock> RateGate<C> {
    pub fn with_clock(limit: u32, window: Duration, clock: C) -> Result<Self> {
        if limit == 0 {
            return Err(AppError::InvalidConfiguration("rate limit must be greater than 0".into()));
        }
        if window.is_zero() {
            return Err(AppError::InvalidConfiguration("rate window must be greater than 0".into()));
        }

        let window_start = clock.now();
        Ok(Self {
            state: Mutex::new(WindowState { window_start, count: 0 }),
            limit,
            window,
            poll_interval: (window / 10).max(MIN_POLL_INTERVAL),
            clock,
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Permits issued in the current window, as of the last evaluation.
    pub fn permits_in_window(&self) -> u32 {
        self.state.lock().count
    }

    /// Evaluates the window once without waiting.
    pub fn try_acquire(&self) -> Option<Permit> {
        let mut state = self.state.lock();
        let now = self.clock.now();

        // `None` means the clock moved backwards: still inside the current window.
        if let Some(elapsed) = now.checked_duration_since(state.window_start) {
            if elapsed > self.window {
                trace!("Rate window rolled over after {:?}", elapsed);
                state.window_start = now;
                state.count = 0;
            }
        }

        if state.count < self.limit {
            state.count += 1;
            Some(Permit {
                window_start: state.window_start,
                granted_at: now,
                sequence: state.count,
            })
        } else {
            None
        }
    }

    /// Waits until a permit is granted. Never fails.
    pub async fn acquire(&self) -> Permit {
        if let Some(permit) = self.try_acquire() {
            return permit;
        }

        let started = self.clock.now();
        debug!("Rate limit of {} per {:?} reached, waiting for next window", self.limit, self.window);
        loop {
            sleep(self.poll_interval).await;
            if let Some(permit) = self.try_acquire() {
                self.log_admitted_after_wait(started, permit);
                return permit;
            }
        }
    }

    /// Like [`acquire`](Self::acquire), but gives up with [`AppError::Cancelled`]
    /// as soon as `shutdown` reads `true`.
    pub async fn acquire_until(&self, shutdown: &mut watch::Receiver<bool>) -> Result<Permit> {
        let started = self.clock.now();
        let mut waited = false;

        loop {
            if *shutdown.borrow() {
                debug!("Shutdown requested while waiting for a permit");
                return Err(AppError::Cancelled);
            }
            if let Some(permit) = self.try_acquire() {
                if waited {
                    self.log_admitted_after_wait(started, permit);
                }
                return Ok(permit);
            }
            waited = true;

            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Sender gone: no shutdown can be signalled any more.
                        return Ok(self.acquire().await);
                    }
                }
            }
        }
    }

    /// Thread-blocking variant for callers outside an async runtime.
    pub fn acquire_blocking(&self) -> Permit {
        loop {
            if let Some(permit) = self.try_acquire() {
                return permit;
            }
            std::thread::sleep(self.poll_interval);
        }
    }

    fn log_admitted_after_wait(&self, started: Instant, permit: Permit) {
        debug!(
            "Permit {}/{} granted after waiting {:?}",
            permit.sequence,
            self.limit,
            permit.granted_at.saturating_duration_since(started)
        );
    }
}
