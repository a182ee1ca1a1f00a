//! HTTP client for the GapHunter engine API.
//!
//! Wraps a shared [`reqwest::Client`] with per-request timeouts, cooperative
//! cancellation, and automatic retry of transient failures. The client keeps
//! no state between calls beyond the connection pool.

use crate::error::{ApiError, ApiResult};
use crate::request::{RequestDescriptor, ResponseBody};
use gaphunter_core::config::ApiConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Client for the GapHunter engine HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a new client from transport settings.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be created.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
            config,
        })
    }

    /// The normalized base URL this client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request described by `descriptor`.
    ///
    /// Transient failures (network errors, 5xx responses) are retried up to
    /// the configured attempt count with a doubling delay between attempts.
    /// A fired cancellation token resolves as [`ApiError::Aborted`] with no
    /// retry, whether it fires before the call, mid-flight, or during a
    /// retry delay.
    ///
    /// # Errors
    /// Returns the terminal [`ApiError`] once retries are exhausted or a
    /// non-retryable failure occurs.
    pub async fn request(&self, descriptor: RequestDescriptor) -> ApiResult<ResponseBody> {
        if descriptor
            .cancellation()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(ApiError::Aborted);
        }

        let url = self.endpoint_url(descriptor.path());
        let max_retries = self.config.max_retries;
        let mut attempt: u32 = 0;

        loop {
            match self.execute_once(&url, &descriptor).await {
                Ok(body) => return Ok(body),
                Err(ApiError::Aborted) => return Err(ApiError::Aborted),
                Err(err) if attempt < max_retries && err.is_retryable() => {
                    let delay = self.config.retry_base_delay() * 2u32.saturating_pow(attempt);
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}), retrying in {:?}: {}",
                        descriptor.path(),
                        attempt + 1,
                        max_retries,
                        delay,
                        err
                    );

                    match descriptor.cancellation() {
                        Some(token) => tokio::select! {
                            () = token.cancelled() => return Err(ApiError::Aborted),
                            () = tokio::time::sleep(delay) => {}
                        },
                        None => tokio::time::sleep(delay).await,
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// GET `path` and decode the JSON response.
    ///
    /// # Errors
    /// Returns the terminal [`ApiError`] of the exchange.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<CancellationToken>,
    ) -> ApiResult<T> {
        let mut descriptor = RequestDescriptor::get(path);
        if let Some(token) = cancel {
            descriptor = descriptor.with_cancellation(token);
        }
        self.request(descriptor).await?.decode()
    }

    /// POST `body` to `path` and decode the JSON response.
    ///
    /// # Errors
    /// Returns the terminal [`ApiError`] of the exchange.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        cancel: Option<CancellationToken>,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Internal(format!("failed to encode request body: {e}")))?;
        let mut descriptor = RequestDescriptor::post(path).with_body(body);
        if let Some(token) = cancel {
            descriptor = descriptor.with_cancellation(token);
        }
        self.request(descriptor).await?.decode()
    }

    /// DELETE `path`, discarding the response body.
    ///
    /// # Errors
    /// Returns the terminal [`ApiError`] of the exchange.
    pub async fn delete(&self, path: &str, cancel: Option<CancellationToken>) -> ApiResult<()> {
        let mut descriptor = RequestDescriptor::delete(path);
        if let Some(token) = cancel {
            descriptor = descriptor.with_cancellation(token);
        }
        self.request(descriptor).await?;
        Ok(())
    }

    /// Run one delivery attempt under the timeout and cancellation token.
    async fn execute_once(
        &self,
        url: &str,
        descriptor: &RequestDescriptor,
    ) -> ApiResult<ResponseBody> {
        let timeout = descriptor.timeout().unwrap_or_else(|| self.config.timeout());

        let mut builder = self
            .http
            .request(descriptor.method().clone(), url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (name, value) in descriptor.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = descriptor.body() {
            builder = builder.json(body);
        }

        tracing::debug!("{} {}", descriptor.method(), url);

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_send_error(&e, timeout))?;
            Self::parse_response(response).await
        };

        match descriptor.cancellation() {
            Some(token) => tokio::select! {
                () = token.cancelled() => Err(ApiError::Aborted),
                outcome = tokio::time::timeout(timeout, exchange) => {
                    outcome.map_err(|_| ApiError::Timeout(timeout))?
                }
            },
            None => tokio::time::timeout(timeout, exchange)
                .await
                .map_err(|_| ApiError::Timeout(timeout))?,
        }
    }

    /// Negotiate the body by content type and map non-success statuses.
    async fn parse_response(response: reqwest::Response) -> ApiResult<ResponseBody> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        if !status.is_success() {
            let body = if is_json {
                response.json::<serde_json::Value>().await.ok()
            } else {
                response.text().await.ok().map(serde_json::Value::String)
            };

            let message = body
                .as_ref()
                .and_then(|b| b.get("error"))
                .and_then(|e| e.as_str())
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message,
                body,
            });
        }

        if is_json {
            let value = response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            Ok(ResponseBody::Json(value))
        } else {
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            Ok(ResponseBody::Text(text))
        }
    }

    fn map_send_error(err: &reqwest::Error, timeout: Duration) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(timeout)
        } else {
            ApiError::Network(err.to_string())
        }
    }

    fn endpoint_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
