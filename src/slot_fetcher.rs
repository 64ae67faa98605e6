use crate::{backend::BookingApi, configuration::Configuration, error::ApiError, types::Slot};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Linear back-off: after failed attempt `n` wait `base_delay × n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(Vec<Slot>),
    Failed(ApiError),
    /// The run was cancelled; whatever came back was dropped.
    Cancelled,
}

pub struct SlotFetcher<A> {
    api: Arc<A>,
    policy: RetryPolicy,
    safety_timeout: Duration,
}

impl<A> Clone for SlotFetcher<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            policy: self.policy,
            safety_timeout: self.safety_timeout,
        }
    }
}

impl<A: BookingApi + Send + Sync> SlotFetcher<A> {
    pub fn new(api: Arc<A>, policy: RetryPolicy, safety_timeout: Duration) -> Self {
        Self {
            api,
            policy,
            safety_timeout,
        }
    }

    pub fn from_configuration<C: Configuration>(api: Arc<A>, configuration: &C) -> Self {
        let policy = RetryPolicy::new(
            configuration.max_attempts(),
            configuration.retry_base_delay(),
        );
        Self::new(api, policy, configuration.safety_timeout())
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Runs the retry sequence. Only one attempt is ever in flight; a request
    /// that is already sent completes even if `cancel` fires meanwhile, but
    /// nothing is sent once it has fired.
    pub async fn fetch(&self, cancel: &CancellationToken) -> FetchOutcome {
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                debug!(attempt, "Slot fetch cancelled before sending");
                return FetchOutcome::Cancelled;
            }
            debug!(attempt, "Fetching available slots");
            let result = self.api.available_slots().await;
            if cancel.is_cancelled() {
                debug!(attempt, "Slot fetch cancelled, dropping response");
                return FetchOutcome::Cancelled;
            }

            match result {
                Ok(slots) => {
                    info!(slots = slots.len(), attempt, "Loaded available slots");
                    return FetchOutcome::Loaded(slots);
                }
                Err(err) if attempt >= self.policy.max_attempts => {
                    error!(?err, attempt, "Failed to fetch slots, giving up");
                    return FetchOutcome::Failed(err);
                }
                Err(err) => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(?err, attempt, ?delay, "Failed to fetch slots, retrying");
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = cancel.cancelled() => return FetchOutcome::Cancelled,
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Runs [`Self::fetch`] against the safety timer. `on_timeout` fires at most
    /// once when the timer wins; the retry sequence keeps going and its
    /// outcome is still returned. Cancelling `cancel` clears the timer.
    pub async fn run<F: FnOnce()>(&self, cancel: &CancellationToken, on_timeout: F) -> FetchOutcome {
        let fetch = self.fetch(cancel);
        tokio::pin!(fetch);

        let timer = async {
            tokio::select! {
                _ = sleep(self.safety_timeout) => true,
                _ = cancel.cancelled() => false,
            }
        };

        tokio::select! {
            outcome = &mut fetch => outcome,
            expired = timer => {
                if expired {
                    warn!(timeout = ?self.safety_timeout, "Slot fetch exceeded safety timeout");
                    on_timeout();
                }
                fetch.await
            }
        }
    }
}
