//! Shared HTTP client for the REST-backed collaborators
//!
//! One `reqwest::Client` per backend instance, with a bounded retry policy:
//! up to 2 retries with exponential backoff for 5xx and network failures,
//! none for 4xx. 401/403 map to auth errors and 429 to quota errors so the
//! caller sees an actionable category instead of a bare status code.

use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tcgen_utils::error::HttpError;
use tracing::{debug, warn};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 2;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Clone, Debug)]
pub(crate) struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `HttpError::Misconfiguration` if the underlying client
    /// cannot be constructed.
    pub fn new() -> Result<Self, HttpError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .use_rustls_tls()
            .build()
            .map_err(|e| HttpError::Misconfiguration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Execute a request with per-request timeout and the retry policy
    /// described in the module docs.
    pub async fn execute_with_retry(
        &self,
        request_builder: reqwest::RequestBuilder,
        timeout: Duration,
        service: &str,
    ) -> Result<Response, HttpError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let request = request_builder
                .try_clone()
                .ok_or_else(|| HttpError::Transport("failed to clone request for retry".to_string()))?
                .timeout(timeout)
                .build()
                .map_err(|e| HttpError::Transport(format!("failed to build request: {e}")))?;

            debug!(service, attempt, timeout_secs = timeout.as_secs(), "executing HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_client_error() {
                        return Err(map_client_error(status, service));
                    }

                    if status.is_server_error() {
                        if attempt <= MAX_RETRIES {
                            warn!(service, attempt, status = status.as_u16(), "server error, will retry");
                            tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                            continue;
                        }
                        return Err(HttpError::Outage(format!("{service} returned {status}")));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        return Err(HttpError::Timeout { duration: timeout });
                    }

                    if attempt <= MAX_RETRIES {
                        warn!(service, attempt, error = %e, "network error, will retry");
                        tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                        continue;
                    }

                    return Err(HttpError::Transport(format!("{service} request failed: {e}")));
                }
            }
        }
    }
}

fn map_client_error(status: StatusCode, service: &str) -> HttpError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            HttpError::Auth(format!("{service} authentication failed: {status}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            HttpError::Quota(format!("{service} rate limit exceeded: {status}"))
        }
        _ => HttpError::Transport(format!("{service} returned client error: {status}")),
    }
}
