//! Cancellable watchdog for the frame-load race.
//!
//! Arming hands out a `WatchdogTask` that the caller runs against whatever
//! timer the platform offers. Cancelling aborts the task's sleep; a task that
//! completes anyway is matched by id, so only the armed watchdog can fire.

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use std::future::Future;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchdogId(u64);

/// Owner side of the watchdog. At most one watchdog is armed at a time.
#[derive(Debug, Default)]
pub struct Watchdog {
    next_id: u64,
    armed: Option<(WatchdogId, AbortHandle)>,
}

impl Watchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a new watchdog, cancelling any previous one
    pub fn arm(&mut self, delay: Duration) -> WatchdogTask {
        self.cancel();
        self.next_id += 1;
        let id = WatchdogId(self.next_id);
        let (handle, registration) = AbortHandle::new_pair();
        self.armed = Some((id, handle));
        WatchdogTask {
            id,
            delay,
            registration,
        }
    }

    /// Cancel the armed watchdog. Returns false if nothing was armed.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Consume the armed watchdog if `id` matches it.
    ///
    /// Returns true exactly once per armed watchdog; stale or cancelled ids
    /// return false.
    pub fn fire(&mut self, id: WatchdogId) -> bool {
        match self.armed {
            Some((armed, _)) if armed == id => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

/// Timer side of an armed watchdog
#[derive(Debug)]
pub struct WatchdogTask {
    id: WatchdogId,
    delay: Duration,
    registration: AbortRegistration,
}

impl WatchdogTask {
    pub fn id(&self) -> WatchdogId {
        self.id
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the watchdog delay using the platform's `sleep`.
    ///
    /// Resolves to the watchdog id if the delay elapsed, or `None` if the
    /// watchdog was cancelled first.
    pub async fn run<S, F>(self, sleep: S) -> Option<WatchdogId>
    where
        S: FnOnce(Duration) -> F,
        F: Future<Output = ()>,
    {
        let WatchdogTask {
            id,
            delay,
            registration,
        } = self;
        Abortable::new(sleep(delay), registration)
            .await
            .ok()
            .map(|()| id)
    }
}
