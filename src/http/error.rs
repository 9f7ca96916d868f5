//! Failure taxonomy for a single request/response cycle against the call API.

use reqwest::StatusCode;
use serde_json::Value;

/// Message used when an error response carries no `message` field.
fn fallback_message(status: StatusCode) -> String {
    format!("HTTP {} error", status.as_u16())
}

/// Errors produced by one call to the remote API.
///
/// The variants are kept apart so that callers can treat network trouble
/// differently from an answer the server gave on purpose.
#[derive(Debug, Clone, PartialEq)]
pub enum CallError {
    /// The request could not be sent or no response was received
    /// (connection refused, DNS failure, timeout, truncated body).
    Transport(String),
    /// The server answered with HTTP status >= 400.
    Api { status: u16, message: String },
    /// The server answered successfully but the body was not what we expected.
    MalformedResponse(String),
}

impl CallError {
    /// Which tier this failure belongs to.
    pub fn kind(&self) -> FaultKind {
        match self {
            CallError::Transport(_) => FaultKind::Transport,
            CallError::Api { .. } => FaultKind::Api,
            CallError::MalformedResponse(_) => FaultKind::MalformedResponse,
        }
    }

    /// The human-readable part of the failure, without the tier prefix.
    pub fn message(&self) -> &str {
        match self {
            CallError::Transport(msg) => msg,
            CallError::Api { message, .. } => message,
            CallError::MalformedResponse(msg) => msg,
        }
    }
}

/// Wraps a reqwest failure in a [`CallError::Transport`] context.
///
/// The reqwest error stays underneath as the source, so `{:#}` renders the whole
/// chain and [`FaultKind::of`] still finds the transport tier.
pub(crate) fn transport_failure(error: reqwest::Error) -> anyhow::Error {
    let summary = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "could not connect to server"
    } else if error.is_body() || error.is_decode() {
        "failed to read response body"
    } else {
        "request failed"
    };
    anyhow::Error::new(error).context(CallError::Transport(summary.to_string()))
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Transport(msg) => write!(f, "Transport failure: {}", msg),
            CallError::Api { status, message } => {
                write!(f, "API error (HTTP {}): {}", status, message)
            }
            CallError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for CallError {}

/// The tier a failure was raised at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Transport,
    Api,
    MalformedResponse,
}

impl FaultKind {
    /// Recovers the tier of an error that went through `anyhow`.
    ///
    /// Errors that did not originate as a [`CallError`] are counted as transport
    /// failures, since nothing was learned from the server.
    pub fn of(error: &anyhow::Error) -> Self {
        error
            .downcast_ref::<CallError>()
            .map(CallError::kind)
            .unwrap_or(FaultKind::Transport)
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FaultKind::Transport => "transport",
            FaultKind::Api => "api",
            FaultKind::MalformedResponse => "malformed-response",
        };
        f.write_str(label)
    }
}

/// Classifies an HTTP status code after the body has been read.
///
/// Returns `Ok(())` for anything below 400. Otherwise returns an API failure carrying
/// the server-supplied `message` when the body has one, or a generic fallback.
pub fn classify_status(status: StatusCode, body: Option<&Value>) -> Result<(), CallError> {
    if status.as_u16() < 400 {
        return Ok(());
    }

    let message = body
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_message(status));

    Err(CallError::Api {
        status: status.as_u16(),
        message,
    })
}
