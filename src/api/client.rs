use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use crate::config::Config;
use crate::http::{CallError, HttpClient, build_http_client};
use crate::poll::{PollConfig, PollObserver, PollOutcome, Poller};

use super::types::{CallHandle, CallRequest, CallStatus, MakeCallBody, MakeCallResponse};

pub const MAKE_CALL_PATH: &str = "/api/make_call";
pub const CALL_STATUS_PATH: &str = "/api/call_status";

/// The two operations the remote call API offers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallApi: Send + Sync {
    /// Starts a call and returns the handle used to query it later.
    async fn initiate_call(&self, request: &CallRequest) -> Result<CallHandle>;

    /// Fetches the current status of a call.
    async fn get_status(&self, handle: &CallHandle) -> Result<CallStatus>;
}

/// HTTP implementation of [`CallApi`].
#[derive(Clone)]
pub struct CallClient {
    http: HttpClient,
    config: Config,
}

impl CallClient {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_http_client(build_http_client(config.request_timeout)?, config))
    }

    pub fn from_parts(base_url: &str, api_key: &str) -> Result<Self> {
        Self::new(Config::new(base_url, api_key)?)
    }

    pub fn with_http_client(http: HttpClient, config: Config) -> Self {
        debug!("Call client configured: {:?}", config);
        Self { http, config }
    }

    /// Polls `handle` until it reaches a terminal state or `poll` runs out of attempts.
    pub async fn poll_status<O: PollObserver>(
        &self,
        handle: &CallHandle,
        poll: &PollConfig,
        observer: &mut O,
    ) -> PollOutcome {
        Poller::new(self, poll.clone()).run(handle, observer).await
    }
}

#[async_trait]
impl CallApi for CallClient {
    #[tracing::instrument(skip(self, request))]
    async fn initiate_call(&self, request: &CallRequest) -> Result<CallHandle> {
        let url = self.config.endpoint(MAKE_CALL_PATH);
        let body = MakeCallBody {
            api_key: &self.config.api_key,
            number: request.number(),
            audio_url: request.audio_url(),
        };

        info!("Initiating call to {}", request.number());
        let response: MakeCallResponse = self.http.post_json(&url, &body).await?;

        match response.request_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                info!("Call initiated, request id {}", id);
                Ok(CallHandle::new(id))
            }
            None => {
                let detail = response
                    .message
                    .map(|m| format!("response has no request_id ({})", m))
                    .unwrap_or_else(|| "response has no request_id".to_string());
                Err(CallError::MalformedResponse(detail).into())
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn get_status(&self, handle: &CallHandle) -> Result<CallStatus> {
        let url = self.config.endpoint(CALL_STATUS_PATH);
        let query = [
            ("api_key", self.config.api_key.as_str()),
            ("request_id", handle.as_str()),
        ];

        let status: CallStatus = self.http.get_json(&url, &query).await?;
        if let Some(duration) = status.duration.filter(|d| *d < 0.0) {
            return Err(CallError::MalformedResponse(format!(
                "negative call duration {}",
                duration
            ))
            .into());
        }
        debug!("Call {}: {}", handle, status);
        Ok(status)
    }
}
