use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Trailing-edge debounce holding at most one pending value.
///
/// Scheduling replaces both the value and the deadline, so only the last
/// value survives a burst and it fires `delay` after the burst ends.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, value: T) {
        self.pending = Some((Instant::now() + self.delay, value));
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves with the pending value once its deadline passes; never
    /// resolves while nothing is scheduled.
    ///
    /// Cancel safe: dropping the future before it resolves keeps the value.
    pub async fn fired(&mut self) -> T {
        if let Some((deadline, _)) = &self.pending {
            sleep_until(*deadline).await;
        }

        match self.pending.take() {
            Some((_, value)) => value,
            None => std::future::pending().await,
        }
    }
}
