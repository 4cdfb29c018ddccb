//! Retry with exponential backoff.
//!
//! [`RetryingClient`] wraps a [`Transport`] and turns one logical request
//! into as many attempts as the [`RetryPolicy`] allows.  Only two outcomes
//! are retried: a transport failure and a `429 Too Many Requests`.  Every
//! other response, successful or not, is handed back untouched for the
//! caller to interpret.
//!
//! The delay starts at `initial_delay` and doubles after every retry.  Each
//! individual wait is capped at `max_delay`.

use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::error::Result;
use crate::observability::{
    CLIENT_RATE_LIMITED, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_RETRIES, CLIENT_REQUESTS,
    CLIENT_RETRIES_EXHAUSTED, CLIENT_RETRY_BACKOFF, CLIENT_TRANSPORT_ERRORS,
};
use crate::transport::{HttpResponse, RequestOptions, Transport};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wait before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Default ceiling for any single wait.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.  Zero disables retrying.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub initial_delay: Duration,
    /// Ceiling for any single wait.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the defaults: 3 retries starting at one second.
    pub fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// A policy that never retries.
    pub fn no_retries() -> Self {
        Self::new().with_max_retries(0)
    }

    /// Sets the number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the wait before the first retry.
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Sets the ceiling for any single wait.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// The wait before retry number `retry` (zero based), after capping.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Every wait the policy would perform if all attempts failed.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries)
            .map(|retry| self.delay_for(retry))
            .collect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client that retries rate-limited and failed attempts.
#[derive(Debug, Clone)]
pub struct RetryingClient<T: Transport> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingClient<T> {
    /// Wrap `transport` with the given policy.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request using the configured policy.
    pub async fn send(&self, url: &Url, options: &RequestOptions) -> Result<HttpResponse> {
        self.send_with(
            url,
            options,
            self.policy.max_retries,
            self.policy.initial_delay,
        )
        .await
    }

    /// Send a request with an explicit retry budget and starting delay.
    ///
    /// Returns the first response that is not a 429.  When retries run out,
    /// returns whatever the last attempt produced: the final 429 response, or
    /// the final transport error.
    pub async fn send_with(
        &self,
        url: &Url,
        options: &RequestOptions,
        max_retries: u32,
        initial_delay: Duration,
    ) -> Result<HttpResponse> {
        let mut retries_left = max_retries;
        let mut delay = initial_delay;
        let mut attempt: u32 = 1;
        loop {
            CLIENT_REQUESTS.click();
            let start = Instant::now();
            let outcome = self.transport.execute(url, options).await;
            CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

            let reason = match &outcome {
                Ok(response) if response.is_rate_limited() => {
                    CLIENT_RATE_LIMITED.click();
                    "rate limited (429)".to_string()
                }
                Ok(response) => {
                    tracing::debug!(
                        attempt,
                        status = response.status().as_u16(),
                        "response received"
                    );
                    return outcome;
                }
                Err(err) => {
                    CLIENT_TRANSPORT_ERRORS.click();
                    err.to_string()
                }
            };

            if retries_left == 0 {
                CLIENT_RETRIES_EXHAUSTED.click();
                tracing::debug!(attempt, %reason, "retries exhausted");
                return outcome;
            }

            let wait = delay.min(self.policy.max_delay);
            tracing::warn!(
                attempt,
                retries_left,
                delay_ms = wait.as_millis() as u64,
                %reason,
                "retrying request"
            );
            CLIENT_REQUEST_RETRIES.click();
            CLIENT_RETRY_BACKOFF.add(wait.as_secs_f64());
            tokio::time::sleep(wait).await;

            retries_left -= 1;
            delay = delay.saturating_mul(2);
            attempt += 1;
        }
    }
}
