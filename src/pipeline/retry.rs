//! The retry/backoff controller: one reusable bounded-attempt wrapper for
//! every engine call in the crate.
//!
//! ## Retry strategy
//!
//! Transient failures (429/503, overload, quota, deadline) are frequent
//! under concurrent load. Exponential backoff (`base_delay_ms * 2^attempt`)
//! avoids thundering-herd: with a 1 s base and 3 attempts the wait sequence
//! is 1 s → 2 s. Terminal failures propagate immediately without consuming
//! an attempt. Attempts are strictly sequential — no attempt begins before
//! the previous attempt's failure and its delay have resolved.

use crate::error::ExtractError;
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Bounded-attempt exponential retry parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never zero.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Policy for interactive flows: fail fast, the user is waiting.
    pub fn interactive() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 1000,
        }
    }

    /// Policy for batch document flows: worth waiting out a longer blip.
    pub fn batch() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1500,
        }
    }

    /// The delay inserted before the attempt that follows failed attempt
    /// `attempt_index` (0-indexed): `base_delay_ms * 2^attempt_index`.
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms * 2u64.pow(attempt_index))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::batch()
    }
}

/// Whether the controller should spend a retry attempt on this failure.
///
/// Only enumerated transient engine kinds qualify; every other error —
/// including [`ExtractError::EngineNoOutput`] and all input errors — is
/// terminal.
fn is_transient(error: &ExtractError) -> bool {
    match error {
        ExtractError::Engine(e) => e.kind.is_transient(),
        _ => false,
    }
}

/// Run `op` under `policy`.
///
/// * Success on any attempt short-circuits immediately.
/// * A terminal failure is re-raised unchanged.
/// * When the final attempt fails with a transient error, the controller
///   raises a single [`ExtractError::ServiceOverloaded`] so callers never
///   have to parse raw engine error text.
pub async fn run<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ExtractError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExtractError>>,
{
    debug_assert!(policy.max_attempts >= 1);

    for attempt in 0..policy.max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if is_transient(&error) => {
                if attempt + 1 == policy.max_attempts {
                    warn!(
                        "Transient failure persisted through {} attempts: {}",
                        policy.max_attempts, error
                    );
                    return Err(ExtractError::ServiceOverloaded {
                        attempts: policy.max_attempts,
                    });
                }
                let delay = policy.backoff_delay(attempt);
                warn!(
                    "Attempt {}/{} failed ({}); retrying in {}ms",
                    attempt + 1,
                    policy.max_attempts,
                    error,
                    delay.as_millis()
                );
                sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }

    // max_attempts >= 1 means the loop always returns above.
    Err(ExtractError::Internal("retry loop exited without a result".into()))
}
