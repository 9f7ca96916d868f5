use crate::api::CallStatus;
use crate::http::FaultKind;

/// Something the poller observed during one attempt.
///
/// A `TransientFault` is produced by the client when a single status check fails and
/// never ends the loop. A `Status` whose label is `"error"` came from the server and
/// is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Status {
        attempt: u32,
        status: CallStatus,
    },
    TransientFault {
        attempt: u32,
        kind: FaultKind,
        message: String,
    },
}

impl PollEvent {
    /// 1-based attempt number this event belongs to.
    pub fn attempt(&self) -> u32 {
        match self {
            PollEvent::Status { attempt, .. } | PollEvent::TransientFault { attempt, .. } => {
                *attempt
            }
        }
    }

    pub fn is_transient_fault(&self) -> bool {
        matches!(self, PollEvent::TransientFault { .. })
    }

    /// The status snapshot, if this attempt produced one.
    pub fn status(&self) -> Option<&CallStatus> {
        match self {
            PollEvent::Status { status, .. } => Some(status),
            PollEvent::TransientFault { .. } => None,
        }
    }
}

impl std::fmt::Display for PollEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollEvent::Status { attempt, status } => write!(f, "[{}] {}", attempt, status),
            PollEvent::TransientFault {
                attempt,
                kind,
                message,
            } => write!(f, "[{}] transient {} fault: {}", attempt, kind, message),
        }
    }
}

/// Receives every event the poller produces, in order.
pub trait PollObserver {
    fn on_event(&mut self, event: &PollEvent);
}

impl<F> PollObserver for F
where
    F: FnMut(&PollEvent),
{
    fn on_event(&mut self, event: &PollEvent) {
        self(event)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {
    fn on_event(&mut self, _event: &PollEvent) {}
}
