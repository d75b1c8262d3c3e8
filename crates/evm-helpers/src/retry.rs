// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Error fragments public RPC endpoints return when throttling
pub const TRANSIENT_RPC_ERRORS: &[&str] = &["429", "rate limit", "timeout", "connection"];

/// An empty fragment list treats every error as transient
fn is_transient(error: &str, fragments: &[&str]) -> bool {
    let error = error.to_lowercase();
    fragments.is_empty()
        || fragments
            .iter()
            .any(|fragment| error.contains(&fragment.to_lowercase()))
}

/// Retry a read-only call with exponential back-off.
///
/// Only for view calls. State changing transactions are never retried automatically.
pub async fn call_with_retry<F, Fut, T>(
    operation: &str,
    transient: &[&str],
    read_fn: F,
) -> eyre::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = eyre::Result<T>>,
{
    let mut backoff = INITIAL_BACKOFF;
    for attempt in 1..MAX_ATTEMPTS {
        match read_fn().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e.to_string(), transient) => {
                warn!(
                    operation,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Transient RPC error, retrying"
                );
                sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
    read_fn().await
}
