//! Call API data model and client.

mod client;
mod types;

pub use client::{CALL_STATUS_PATH, CallApi, CallClient, MAKE_CALL_PATH};
#[cfg(test)]
pub use client::MockCallApi;
pub use types::{CallHandle, CallRequest, CallStatus, TERMINAL_STATES, is_terminal_state};
