use anyhow::{Context, Result};
use log::debug;

use crate::api::{CallApi, CallHandle, CallRequest};

/// Start a call and print its request id.
#[tracing::instrument(skip(api))]
pub async fn call<A: CallApi + ?Sized>(
    api: &A,
    number: &str,
    audio_url: Option<&str>,
) -> Result<CallHandle> {
    let mut request = CallRequest::new(number);
    if let Some(audio_url) = audio_url {
        request = request.with_audio_url(audio_url);
    }
    debug!("Call request: {:?}", request);

    let handle = api
        .initiate_call(&request)
        .await
        .with_context(|| format!("Failed to initiate call to {}", number))?;

    println!("{}", handle);
    Ok(handle)
}
