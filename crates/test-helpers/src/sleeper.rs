// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use async_trait::async_trait;
use fixn_utils::{Liveness, Sleeper};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Default)]
struct Inner {
    slept: Vec<Duration>,
    dispose_after: Option<(usize, Liveness)>,
}

/// Returns immediately and remembers every requested delay
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose `liveness` once `count` sleeps have been requested
    pub fn dispose_after(self, count: usize, liveness: Liveness) -> Self {
        self.inner.lock().unwrap().dispose_after = Some((count, liveness));
        self
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().slept.clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.slept.push(duration);
            if let Some((count, liveness)) = &inner.dispose_after {
                if inner.slept.len() >= *count {
                    liveness.dispose();
                }
            }
        }
        tokio::task::yield_now().await;
    }
}
