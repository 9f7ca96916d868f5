//! Transport layer: one request/response cycle and failure classification.

mod client;
mod error;

pub use client::{CONNECT_TIMEOUT, HttpClient, REQUEST_TIMEOUT, build_http_client};
pub use error::{CallError, FaultKind, classify_status};
