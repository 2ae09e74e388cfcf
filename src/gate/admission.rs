//! Blocking admission gate.
//!
//! The gate hands out at most `capacity` slots per window. Callers that find
//! the window exhausted are suspended until the background ticker starts a new
//! window, then race again for the fresh slots.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use super::counter::SlotCounter;
use crate::config::GateConfig;
use crate::error::{Result, TollgateError};

/// Point-in-time view of a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateStats {
    /// Slots per window
    pub capacity: u64,
    /// Slots consumed in the current window
    pub used: u64,
    /// Slots left in the current window
    pub available: u64,
    /// Callers currently suspended in `acquire`
    pub waiting: usize,
    /// Window length
    pub window: Duration,
    /// Windows started since construction
    pub resets: u64,
    /// Slots granted since construction
    pub granted_total: u64,
    /// Wall-clock time of the last reset
    pub last_reset_at: Option<DateTime<Utc>>,
}

struct GateState {
    counter: SlotCounter,
    waiting: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<GateState>,
    notify: Notify,
}

impl Shared {
    fn reset_window(&self) {
        let (released, waiting) = {
            let mut state = self.state.lock();
            if state.shutdown {
                return;
            }
            let released = state.counter.used();
            state.counter.reset();
            (released, state.waiting)
        };

        // Wake everyone; each waiter re-checks the counter under the lock.
        self.notify.notify_waiters();

        trace!(released, waiting, "Admission window reset");
    }
}

/// Decrements the waiter count when a suspended acquisition ends, including
/// when its future is dropped mid-wait.
struct WaiterGuard<'a> {
    shared: &'a Shared,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.shared.state.lock().waiting -= 1;
    }
}

/// An admission gate enforcing at most `capacity` acquisitions per window.
///
/// The gate is safe to share across tasks; wrap it in an `Arc` to hand it to
/// several submitters.
pub struct AdmissionGate {
    shared: Arc<Shared>,
    window: Duration,
    capacity: u64,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl AdmissionGate {
    /// Create a new gate and start its window ticker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(window: Duration, capacity: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(TollgateError::Config(
                "gate capacity must be greater than 0".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(TollgateError::Config(
                "gate window must be greater than 0".to_string(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            TollgateError::Config(format!("admission gate requires a Tokio runtime: {}", e))
        })?;

        let shared = Arc::new(Shared {
            state: Mutex::new(GateState {
                counter: SlotCounter::new(capacity),
                waiting: 0,
                shutdown: false,
            }),
            notify: Notify::new(),
        });

        let ticker = runtime.spawn(run_ticker(Arc::clone(&shared), window));

        info!(
            window_ms = window.as_millis() as u64,
            capacity,
            "Admission gate started"
        );

        Ok(Self {
            shared,
            window,
            capacity,
            ticker: Mutex::new(Some(ticker)),
        })
    }

    /// Create a gate from configuration.
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.window.duration(), config.capacity)
    }

    /// Wait for a slot and consume it.
    ///
    /// Dropping the returned future while it waits abandons the wait without
    /// consuming a slot.
    pub async fn acquire(&self) -> Result<()> {
        self.acquire_until(std::future::pending::<()>()).await
    }

    /// Wait for a slot, giving up with [`TollgateError::Cancelled`] if `cancel`
    /// completes first.
    pub async fn acquire_until<F>(&self, cancel: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let mut waiter: Option<WaiterGuard<'_>> = None;

        loop {
            // Register for the next reset before looking at the counter, so a
            // reset between the check and the await is not missed.
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let outcome = {
                let mut state = self.shared.state.lock();
                if state.shutdown {
                    Some(Err(TollgateError::Shutdown))
                } else if state.counter.try_take() {
                    trace!(
                        used = state.counter.used(),
                        capacity = self.capacity,
                        "Slot granted"
                    );
                    Some(Ok(()))
                } else {
                    if waiter.is_none() {
                        state.waiting += 1;
                        waiter = Some(WaiterGuard {
                            shared: &self.shared,
                        });
                        debug!(waiting = state.waiting, "Window exhausted, waiting for reset");
                    }
                    None
                }
            };
            if let Some(result) = outcome {
                return result;
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = &mut cancel => {
                    debug!("Slot wait cancelled");
                    return Err(TollgateError::Cancelled);
                }
            }
        }
    }

    /// Wait for a slot for at most `timeout`.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<()> {
        self.acquire_until(tokio::time::sleep(timeout)).await
    }

    /// Consume a slot only if one is free right now.
    pub fn try_acquire(&self) -> Result<bool> {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(TollgateError::Shutdown);
        }
        Ok(state.counter.try_take())
    }

    /// Stop the window ticker and release all waiters with
    /// [`TollgateError::Shutdown`].
    pub fn shutdown(&self) {
        let released = {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                return;
            }
            state.shutdown = true;
            state.waiting
        };

        if let Some(ticker) = self.ticker.lock().take() {
            ticker.abort();
        }
        self.shared.notify.notify_waiters();

        info!(released, "Admission gate shut down");
    }

    /// Check whether the gate has been shut down.
    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    /// Get the number of slots per window.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Get the window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Get the slots consumed in the current window.
    pub fn used(&self) -> u64 {
        self.shared.state.lock().counter.used()
    }

    /// Get the slots left in the current window.
    pub fn available(&self) -> u64 {
        self.shared.state.lock().counter.remaining()
    }

    /// Get the number of callers currently waiting for a slot.
    pub fn waiting(&self) -> usize {
        self.shared.state.lock().waiting
    }

    /// Take a consistent snapshot of the gate's counters.
    pub fn stats(&self) -> GateStats {
        let state = self.shared.state.lock();
        GateStats {
            capacity: self.capacity,
            used: state.counter.used(),
            available: state.counter.remaining(),
            waiting: state.waiting,
            window: self.window,
            resets: state.counter.resets(),
            granted_total: state.counter.granted_total(),
            last_reset_at: state.counter.last_reset_at(),
        }
    }
}

impl Drop for AdmissionGate {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get_mut().take() {
            ticker.abort();
        }
    }
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("window", &self.window)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Reset the window every `window`, aligned to gate construction.
async fn run_ticker(shared: Arc<Shared>, window: Duration) {
    let mut ticker = interval_at(Instant::now() + window, window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        shared.reset_window();
    }
}
