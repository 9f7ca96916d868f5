use anyhow::{Context, Result};

use crate::api::{CallApi, CallHandle, CallStatus};

/// Fetch and print one status snapshot.
#[tracing::instrument(skip(api))]
pub async fn status<A: CallApi + ?Sized>(api: &A, request_id: &str) -> Result<CallStatus> {
    let handle = CallHandle::from(request_id);
    let status = api
        .get_status(&handle)
        .await
        .with_context(|| format!("Failed to get status of call {}", handle))?;

    println!("{}", status);
    Ok(status)
}
