//! Scheduler — an owned periodic-task resource.
//!
//! DESIGN
//! ======
//! Components that need a recurring tick receive a `Scheduler` they own,
//! with explicit `start`/`stop` and guaranteed cancellation on drop. No
//! module-level timers: whoever holds the value controls the lifetime.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

pub struct Scheduler {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Start a periodic task. The first tick fires immediately, then every
    /// `interval`; a slow tick skips missed runs rather than bunching them.
    #[must_use]
    pub fn start<F, Fut>(name: &'static str, interval: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        info!(name, interval_secs = interval.as_secs(), "scheduler started");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                task().await;
            }
        });
        Self { name, handle: Some(handle) }
    }

    /// Cancel the task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!(name = self.name, "scheduler stopped");
        }
    }

    /// True while the task is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
