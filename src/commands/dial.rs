use anyhow::Result;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::api::CallApi;
use crate::poll::{PollConfig, PollOutcome};

use super::{call, poll};

/// Start a call and follow it until it finishes or the poll budget runs out.
#[tracing::instrument(skip(api, config, cancel))]
pub async fn dial<A: CallApi + ?Sized>(
    api: &A,
    number: &str,
    audio_url: Option<&str>,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<PollOutcome> {
    let handle = call(api, number, audio_url).await?;
    info!("Following call {} to {}", handle, number);
    Ok(poll(api, handle.as_str(), config, cancel).await)
}
