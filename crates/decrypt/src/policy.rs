// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fixn_config::DecryptConfig;
use fixn_utils::{Liveness, Sleeper};
use std::{future::Future, time::Duration};
use tracing::{debug, trace};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Fixed budget polling. Waits `interval` after every attempt that is not ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&DecryptConfig> for PollPolicy {
    fn from(config: &DecryptConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            interval: config.interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
    Cancelled { attempts: u32 },
}

impl PollPolicy {
    /// Upper bound on time spent sleeping
    pub fn total_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Call `probe` with 1-based attempt numbers until it yields a value,
    /// the budget runs out or `liveness` is disposed. Probe errors end the run.
    pub async fn run<T, E, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        liveness: &Liveness,
        mut probe: F,
    ) -> Result<PollOutcome<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        for attempt in 1..=self.max_attempts {
            if !liveness.is_alive() {
                return Ok(PollOutcome::Cancelled {
                    attempts: attempt - 1,
                });
            }

            if let Some(value) = probe(attempt).await? {
                debug!(attempt, "poll ready");
                return Ok(PollOutcome::Ready {
                    value,
                    attempts: attempt,
                });
            }

            trace!(attempt, max = self.max_attempts, "not ready");
            if !liveness.sleep(sleeper, self.interval).await {
                return Ok(PollOutcome::Cancelled { attempts: attempt });
            }
        }

        Ok(PollOutcome::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixn_test_helpers::RecordingSleeper;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn default_budget_is_thirty_seconds() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 20);
        assert_eq!(policy.total_wait(), Duration::from_secs(30));
        assert_eq!(PollPolicy::from(&DecryptConfig::default()), policy);
    }

    #[tokio::test]
    async fn gives_up_after_the_budget() {
        let sleeper = RecordingSleeper::new();
        let calls = AtomicU32::new(0);
        let outcome: PollOutcome<()> = PollPolicy::default()
            .run(&sleeper, &Liveness::new(), |_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(None)
            })
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 20 });
        assert_eq!(calls.load(Ordering::SeqCst), 20);
        assert_eq!(sleeper.sleeps().len(), 20);
        assert_eq!(sleeper.total(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn stops_at_first_ready_attempt() {
        let sleeper = RecordingSleeper::new();
        let outcome = PollPolicy::default()
            .run(&sleeper, &Liveness::new(), |attempt| async move {
                Ok::<_, ()>((attempt == 3).then_some("done"))
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Ready {
                value: "done",
                attempts: 3
            }
        );
        assert_eq!(sleeper.sleeps(), vec![DEFAULT_POLL_INTERVAL; 2]);
    }

    #[tokio::test]
    async fn probe_errors_end_the_run() {
        let sleeper = RecordingSleeper::new();
        let result: Result<PollOutcome<()>, &str> = PollPolicy::default()
            .run(&sleeper, &Liveness::new(), |attempt| async move {
                if attempt == 2 {
                    Err("rpc down")
                } else {
                    Ok(None)
                }
            })
            .await;
        assert_eq!(result, Err("rpc down"));
        assert_eq!(sleeper.sleeps().len(), 1);
    }

    #[tokio::test]
    async fn disposal_stops_further_attempts() {
        let liveness = Liveness::new();
        let sleeper = RecordingSleeper::new().dispose_after(4, liveness.clone());
        let calls = AtomicU32::new(0);
        let outcome: PollOutcome<()> = PollPolicy::default()
            .run(&sleeper, &liveness, |_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(None)
            })
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::Cancelled { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
