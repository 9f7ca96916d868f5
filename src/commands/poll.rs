use log::debug;
use tokio_util::sync::CancellationToken;

use crate::api::{CallApi, CallHandle};
use crate::poll::{PollConfig, PollEvent, PollOutcome, Poller};

/// Poll a call, printing every observation and a final summary line.
#[tracing::instrument(skip(api, config, cancel))]
pub async fn poll<A: CallApi + ?Sized>(
    api: &A,
    request_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> PollOutcome {
    let handle = CallHandle::from(request_id);
    debug!("Polling {} with {:?}", handle, config);

    let poller = Poller::new(api, config.clone());
    let outcome = poller
        .run_with_cancel(&handle, &mut |e: &PollEvent| println!("{}", e), cancel)
        .await;

    print_outcome(&handle, &outcome);
    outcome
}

fn print_outcome(handle: &CallHandle, outcome: &PollOutcome) {
    println!("{}", summarize(handle, outcome));
}

fn summarize(handle: &CallHandle, outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Completed(status) => format!("Call {} finished: {}", handle, status),
        PollOutcome::Exhausted { attempts } => format!(
            "Call {} exhausted: no terminal state after {} attempts",
            handle, attempts
        ),
        PollOutcome::Cancelled { attempts } => {
            format!("Call {} polling cancelled after {} attempts", handle, attempts)
        }
    }
}
