// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Exponential backoff for idempotent Mackerel API reads.
///
/// Only requests that can be repeated safely go through here, and only
/// failures the caller marks as transient are retried. Creating, updating
/// and deleting dashboards is attempted exactly once.
use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry behavior for API reads.
#[derive(Debug, Clone, PartialEq,)]
pub struct RetryConfig
{
    /// Total attempts including the first one (default: 3).
    pub max_attempts:   u32,
    /// Delay before the second attempt (default: 500ms).
    pub initial_delay:  Duration,
    /// Multiplier applied to the delay after every failure (default: 2.0).
    pub backoff_factor: f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, initial_delay: Duration::from_millis(500,), backoff_factor: 2.0,
        }
    }
}

impl RetryConfig
{
    fn next_delay(&self, delay: Duration,) -> Duration
    {
        delay.mul_f64(self.backoff_factor.max(1.0,),)
    }
}

/// Runs `operation` until it succeeds or `config.max_attempts` is reached.
///
/// # Errors
///
/// Returns the error of the last attempt.
///
/// # Example
///
/// ```no_run
/// use masterror::AppError;
/// use mkr_dashboards::{RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), AppError> {
/// let org = retry_with_backoff(&RetryConfig::default(), "GET /api/v0/org", || async {
///     Ok::<_, AppError,>("example".to_owned(),)
/// },)
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T, E,>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T, E,>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E,>,>,
    E: Display,
{
    retry_with_backoff_if(config, operation_name, operation, |_| true,).await
}

/// Like [`retry_with_backoff`], but gives up immediately on errors for which
/// `is_transient` returns `false`.
///
/// # Errors
///
/// Returns the first permanent error, or the error of the last attempt.
pub async fn retry_with_backoff_if<F, Fut, T, E, P,>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    is_transient: P,
) -> Result<T, E,>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E,>,>,
    E: Display,
    P: Fn(&E,) -> bool,
{
    let max_attempts = config.max_attempts.max(1,);
    let mut attempt = 1;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(value,) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "request succeeded after retry");
                }
                return Ok(value,);
            }
            Err(error,) if !is_transient(&error,) => {
                debug!(operation = operation_name, attempt, %error, "permanent failure, not retrying");
                return Err(error,);
            }
            Err(error,) if attempt >= max_attempts => {
                warn!(operation = operation_name, attempts = max_attempts, %error, "giving up");
                return Err(error,);
            }
            Err(error,) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    %error,
                    delay_ms = delay.as_millis() as u64,
                    "request failed, retrying"
                );
                sleep(delay,).await;
                delay = config.next_delay(delay,);
                attempt += 1;
            }
        }
    }
}
