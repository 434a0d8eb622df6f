use reqwest::blocking::{Client, RequestBuilder, Response};
use std::thread;
use std::time::Duration;
use tracing::warn;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Sends the request built by `build`, retrying transient transport failures
/// and 5xx responses. 4xx responses are returned as-is on the first attempt.
pub fn send_with_retries<F>(
    policy: &RetryPolicy,
    label: &str,
    mut build: F,
) -> reqwest::Result<Response>
where
    F: FnMut() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        let can_retry = attempt < policy.max_retries;
        match build().send() {
            Ok(response) if response.status().is_server_error() && can_retry => {
                warn!(
                    %label,
                    status = response.status().as_u16(),
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    "retrying after server error"
                );
            }
            Ok(response) => return Ok(response),
            Err(err) if is_transient(&err) && can_retry => {
                warn!(
                    %label,
                    error = %err,
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    "retrying after transient request failure"
                );
            }
            Err(err) => return Err(err),
        }
        thread::sleep(policy.delay(attempt));
        attempt += 1;
    }
}

pub fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// Cuts long response bodies before they end up in error messages.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
