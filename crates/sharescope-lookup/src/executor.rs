//! Search requests with throttling-aware retries.
//!
//! One GET per entity against `{host}/_api/search/query`. Responses 429, 500
//! and 503 are retried after the server's `Retry-After` delay (seconds) or a
//! default delay, up to a fixed number of attempts. Any other non-200 status
//! fails immediately. Waits are async sleeps scoped to the one query.

use crate::error::{LookupError, Result};
use crate::query_builder::build_query;
use crate::response::SearchResponse;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use sharescope_auth::AccessToken;
use sharescope_core::{Entity, IntegrationOptions};
use std::time::Duration;

/// Server-side row cap requested with every query.
pub const ROW_LIMIT: u32 = 10;

/// Total attempts per query, the first request included.
const MAX_ATTEMPTS: u32 = 4;

/// Delay used when a retryable response carries no `Retry-After`.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

const NOMETADATA: &str = "application/json;odata=nometadata";

/// Anything that can run one entity search.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search for `entity` with an already acquired token.
    async fn search(
        &self,
        entity: &Entity,
        token: &AccessToken,
        options: &IntegrationOptions,
    ) -> Result<SearchResponse>;
}

/// Retry limits for throttled or failing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least one
    pub max_attempts: u32,
    /// Wait when the server gives no `Retry-After`
    pub default_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            default_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// HTTP search client.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl QueryExecutor {
    /// Create an executor with the default retry policy.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            max_attempts: retry.max_attempts.max(1),
            ..retry
        };
        self
    }

    /// Run the search for `entity`, retrying throttled and 5xx responses.
    pub async fn query(
        &self,
        entity: &Entity,
        token: &AccessToken,
        options: &IntegrationOptions,
    ) -> Result<SearchResponse> {
        let url = format!("{}/_api/search/query", options.host_trimmed());
        let querytext = build_query(entity, options);
        let row_limit = ROW_LIMIT.to_string();
        let mut last_status = StatusCode::SERVICE_UNAVAILABLE;

        tracing::trace!(entity = %entity.value, querytext = %querytext, "searching");

        for attempt in 1..=self.retry.max_attempts {
            let response = self
                .http
                .get(&url)
                .query(&[("querytext", querytext.as_str()), ("RowLimit", row_limit.as_str())])
                .bearer_auth(token.secret())
                .header(ACCEPT, NOMETADATA)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::OK {
                tracing::trace!(headers = ?response.headers(), "search response headers");
                let body = response.text().await?;
                return serde_json::from_str(&body)
                    .map_err(|e| LookupError::InvalidResponse(e.to_string()));
            }

            if !is_retryable(status) {
                let body = response.text().await.unwrap_or_default();
                return Err(LookupError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            last_status = status;
            if attempt < self.retry.max_attempts {
                let delay = retry_after(response.headers()).unwrap_or(self.retry.default_delay);
                tracing::warn!(
                    entity = %entity.value,
                    status = status.as_u16(),
                    "search throttled (attempt {}/{}), retrying in {:?}",
                    attempt,
                    self.retry.max_attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(LookupError::RetriesExhausted {
            status: last_status.as_u16(),
            attempts: self.retry.max_attempts,
        })
    }
}

#[async_trait]
impl SearchBackend for QueryExecutor {
    async fn search(
        &self,
        entity: &Entity,
        token: &AccessToken,
        options: &IntegrationOptions,
    ) -> Result<SearchResponse> {
        self.query(entity, token, options).await
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

/// `Retry-After` in delta-seconds form; HTTP dates are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 7 "));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn test_policy_needs_one_attempt() {
        let executor = QueryExecutor::new(reqwest::Client::new()).with_retry_policy(RetryPolicy {
            max_attempts: 0,
            default_delay: Duration::ZERO,
        });
        assert_eq!(executor.retry.max_attempts, 1);
    }
}
