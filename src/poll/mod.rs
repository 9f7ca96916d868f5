//! Bounded polling of a call's status until it reaches a terminal state.
//!
//! The loop checks status at most `max_attempts` times. A failed check is reported to
//! the observer as a transient fault and retried after a short delay. A terminal
//! status ends the loop at once. Running out of attempts is a normal outcome, not an
//! error.

mod event;

use std::time::Duration;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::api::{CallApi, CallHandle, CallStatus};
use crate::http::FaultKind;

pub use event::{NoopObserver, PollEvent, PollObserver};

/// Delay between healthy, still-in-progress checks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Number of status checks before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 12;

/// Delay after a failed check.
pub const FAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
    pub fault_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fault_delay: FAULT_RETRY_DELAY,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            ..Self::default()
        }
    }
}

/// How a poll session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// A terminal status was observed.
    Completed(CallStatus),
    /// Every attempt was used without seeing a terminal status.
    Exhausted { attempts: u32 },
    /// The caller cancelled the session.
    Cancelled { attempts: u32 },
}

impl PollOutcome {
    /// The terminal status, or `None` when the session was exhausted or cancelled.
    pub fn into_status(self) -> Option<CallStatus> {
        match self {
            PollOutcome::Completed(status) => Some(status),
            PollOutcome::Exhausted { .. } | PollOutcome::Cancelled { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, PollOutcome::Exhausted { .. })
    }
}

/// Drives repeated status checks for one call handle.
pub struct Poller<'a, A: CallApi + ?Sized> {
    api: &'a A,
    config: PollConfig,
}

impl<'a, A: CallApi + ?Sized> Poller<'a, A> {
    pub fn new(api: &'a A, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Polls without any way to cancel early.
    pub async fn run<O>(&self, handle: &CallHandle, observer: &mut O) -> PollOutcome
    where
        O: PollObserver + ?Sized,
    {
        self.run_with_cancel(handle, observer, &CancellationToken::new())
            .await
    }

    /// Polls until a terminal status, exhaustion, or `cancel` fires.
    ///
    /// Cancellation is checked before each request, while a request is in flight, and
    /// while waiting between attempts.
    #[tracing::instrument(skip(self, observer, cancel), fields(max_attempts = self.config.max_attempts))]
    pub async fn run_with_cancel<O>(
        &self,
        handle: &CallHandle,
        observer: &mut O,
        cancel: &CancellationToken,
    ) -> PollOutcome
    where
        O: PollObserver + ?Sized,
    {
        let mut attempt: u32 = 0;

        while attempt < self.config.max_attempts {
            if cancel.is_cancelled() {
                info!("Polling of {} cancelled after {} attempts", handle, attempt);
                return PollOutcome::Cancelled { attempts: attempt };
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Polling of {} cancelled during request", handle);
                    return PollOutcome::Cancelled { attempts: attempt };
                }
                result = self.api.get_status(handle) => result,
            };

            let number = attempt + 1;
            let delay = match result {
                Ok(status) => {
                    debug!(
                        "Attempt {}/{}: {}",
                        number, self.config.max_attempts, status
                    );
                    observer.on_event(&PollEvent::Status {
                        attempt: number,
                        status: status.clone(),
                    });

                    if status.is_terminal() {
                        info!("Call {} reached terminal state {}", handle, status.status);
                        return PollOutcome::Completed(status);
                    }
                    self.config.interval
                }
                Err(e) => {
                    let kind = FaultKind::of(&e);
                    warn!(
                        "Attempt {}/{} failed ({}), retrying in {:?}...",
                        number, self.config.max_attempts, e, self.config.fault_delay
                    );
                    observer.on_event(&PollEvent::TransientFault {
                        attempt: number,
                        kind,
                        message: format!("{:#}", e),
                    });
                    self.config.fault_delay
                }
            };

            attempt = number;

            // Nothing left to wait for after the final attempt.
            if attempt >= self.config.max_attempts {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Polling of {} cancelled after {} attempts", handle, attempt);
                    return PollOutcome::Cancelled { attempts: attempt };
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(
            "Call {} still not finished after {} attempts",
            handle, self.config.max_attempts
        );
        PollOutcome::Exhausted { attempts: attempt }
    }
}
