// src/retry.rs

//! Fixed-interval retry wrapper.
//!
//! Wraps any fallible async operation: on failure, wait a constant interval
//! and try again; after `max_retries` consecutive failures the last error is
//! propagated unmodified. No backoff, no jitter.

use std::time::Duration;

use crate::error::Result;

/// Execute `op` up to `max_retries` times, sleeping `sleep_interval`
/// between failed attempts.
///
/// Each failed attempt is logged before sleeping. The final failure is
/// returned to the caller as-is.
pub async fn retry_on_fail<T, F, Fut>(
    max_retries: u32,
    sleep_interval: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_retries = max_retries.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries => {
                log::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    max_retries,
                    e,
                    sleep_interval
                );
                tokio::time::sleep(sleep_interval).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!("Attempt {}/{} failed: {}. Giving up", attempt, max_retries, e);
                return Err(e);
            }
        }
    }
}
