use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status labels after which a call is not expected to change again.
pub const TERMINAL_STATES: [&str; 5] = ["completed", "error", "no_answer", "timeout", "disconnected"];

/// Returns true if `status` is one of [`TERMINAL_STATES`].
pub fn is_terminal_state(status: &str) -> bool {
    TERMINAL_STATES.contains(&status)
}

/// A request to start one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    number: String,
    audio_url: Option<String>,
}

impl CallRequest {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            audio_url: None,
        }
    }

    /// Audio to play once the call is answered. Without it the server uses its default.
    pub fn with_audio_url(mut self, audio_url: impl Into<String>) -> Self {
        self.audio_url = Some(audio_url.into());
        self
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }
}

/// Identifier the API hands back for an initiated call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallHandle(String);

impl CallHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CallHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CallHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CallHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One snapshot of a call as reported by `GET /api/call_status`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct CallStatus {
    pub status: String,
    /// Call duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_played: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_completed: Option<bool>,
    /// Fields the server sent that this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CallStatus {
    pub fn is_terminal(&self) -> bool {
        is_terminal_state(&self.status)
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "status={}", self.status)?;
        if let Some(duration) = self.duration {
            write!(f, " duration={}s", duration)?;
        }
        if let Some(played) = self.audio_played {
            write!(f, " audio_played={}", played)?;
        }
        if let Some(completed) = self.audio_completed {
            write!(f, " audio_completed={}", completed)?;
        }
        if let Some(message) = &self.message {
            write!(f, " message={:?}", message)?;
        }
        Ok(())
    }
}

/// Wire body of `POST /api/make_call`.
#[derive(Serialize, Debug)]
pub(crate) struct MakeCallBody<'a> {
    pub api_key: &'a str,
    pub number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<&'a str>,
}

/// Wire response of `POST /api/make_call`.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct MakeCallResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
