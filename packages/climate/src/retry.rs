//! HTTP retry helper for provider requests.
//!
//! Provider clients should call [`send_json`] instead of
//! `reqwest::RequestBuilder::send()` directly so every request gets retried
//! with exponential backoff on transient failures (timeouts, connection
//! resets, server errors, rate limiting).
//!
//! The retry budget comes from the service configuration. A request that
//! still fails after it degrades its cluster to synthetic data.

use std::time::Duration;

use crate::ClimateError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (since builders are consumed by
/// `.send()`).
///
/// Connection errors, timeouts, HTTP 429 and HTTP 5xx are retried up to
/// `max_retries` times with exponential backoff (2s, 4s, 8s, ...). Other 4xx
/// statuses are permanent. A body that cannot be parsed as JSON is not
/// retried.
///
/// # Errors
///
/// Returns [`ClimateError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body is not valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    build_request: F,
    max_retries: u32,
) -> Result<serde_json::Value, ClimateError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, max_retries).await?;

    let url = response.url().to_string();
    let status = response.status();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {preview}",
            text.len(),
        );
        ClimateError::Json(e)
    })
}

/// Core retry loop. Returns the successful [`reqwest::Response`] (status 2xx
/// or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(build_request: &F, max_retries: u32) -> Result<reqwest::Response, ClimateError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<ClimateError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt.min(6));
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(ClimateError::Http(e));
                    continue;
                }
                return Err(ClimateError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                // 429 Too Many Requests and 5xx are worth another attempt
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status}");
                        last_error = Some(ClimateError::Status { status });
                        continue;
                    }
                    return Err(ClimateError::Status { status });
                }

                if status.is_client_error() {
                    return Err(ClimateError::Status { status });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ClimateError::Malformed {
        message: "request failed after all retries".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
