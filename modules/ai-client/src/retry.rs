//! Retry with exponential backoff, and model fallback chains.
//!
//! The two are independent: [`RetryPolicy`] decides whether and when to try
//! again, [`ModelChain`] decides which model a given attempt talks to.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay * 2u32.pow(exp)
    }
}

/// Primary model plus ordered fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain {
    primary: String,
    fallbacks: Vec<String>,
}

impl ModelChain {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallbacks: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, model: impl Into<String>) -> Self {
        self.fallbacks.push(model.into());
        self
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Model for attempt `attempt` (1-based). Attempt 1 is the primary; later
    /// attempts walk the fallbacks and stay on the last one once exhausted.
    pub fn model_for_attempt(&self, attempt: u32) -> &str {
        if attempt <= 1 || self.fallbacks.is_empty() {
            return &self.primary;
        }
        let idx = (attempt as usize - 2).min(self.fallbacks.len() - 1);
        &self.fallbacks[idx]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Error returned once every attempt has failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: Display> Display for Exhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed after {} attempt(s): {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for Exhausted<E> {}

/// Run `op` until it succeeds or the policy is exhausted. `op` receives the
/// 1-based attempt number.
pub async fn with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> std::result::Result<Retried<T>, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(Retried { value, attempts: attempt }),
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: e,
                })
            }
        }
    }
}
