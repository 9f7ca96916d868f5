pub mod api;
pub mod commands;
pub mod config;
pub mod http;
pub mod poll;

pub use api::{CallApi, CallClient, CallHandle, CallRequest, CallStatus};
pub use config::Config;
pub use http::{CallError, FaultKind};
pub use poll::{PollConfig, PollEvent, PollObserver, PollOutcome, Poller};
