//! HTTP client that performs exactly one request/response cycle per call.

use anyhow::Result;
use log::debug;
use reqwest::{
    Client, RequestBuilder,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;

use super::error::{CallError, classify_status, transport_failure};

/// Default upper bound on one request, from connect to the last body byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on establishing the connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the reqwest client used for every call API request.
///
/// All requests carry `Content-Type: application/json`, GET included. A request that
/// gets no complete answer within `timeout` fails as a transport failure.
pub fn build_http_client(timeout: Duration) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .user_agent(concat!("callctl/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .build()?;

    Ok(HttpClient::new(client))
}

/// Thin wrapper over reqwest that never fails on a status code before the body is read.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request with query parameters and decodes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        // Query values may hold the api key, so only the url is logged.
        debug!("GET {}...", url);
        self.send_json(self.client.get(url).query(query)).await
    }

    /// Performs a POST request with a JSON body and decodes the JSON response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}...", url);
        self.send_json(self.client.post(url).json(body)).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(transport_failure)?;

        let body: Option<Value> = serde_json::from_slice(&bytes).ok();
        debug!("HTTP {} ({} bytes)", status.as_u16(), bytes.len());

        classify_status(status, body.as_ref())?;

        let body = body.ok_or_else(|| {
            CallError::MalformedResponse(format!(
                "response body is not valid JSON (HTTP {})",
                status.as_u16()
            ))
        })?;

        let decoded = serde_json::from_value::<T>(body)
            .map_err(|e| CallError::MalformedResponse(e.to_string()))?;

        Ok(decoded)
    }
}
