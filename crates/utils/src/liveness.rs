// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::Sleeper;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::trace;

/// Cloneable liveness flag handed to long running tasks. Once disposed it stays disposed.
#[derive(Clone, Debug)]
pub struct Liveness {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Mark the owner as gone. Every clone observes this.
    pub fn dispose(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_alive(&self) -> bool {
        !*self.rx.borrow()
    }

    /// Resolves once `dispose` has been called on any clone
    pub async fn disposed(&self) {
        let mut rx = self.rx.clone();
        // Sender lives as long as self so this only errors if it was dropped
        let _ = rx.wait_for(|disposed| *disposed).await;
    }

    /// Sleep unless disposed first. Returns false when the sleep was cut short.
    pub async fn sleep(&self, sleeper: &dyn Sleeper, duration: Duration) -> bool {
        if !self.is_alive() {
            return false;
        }
        tokio::select! {
            _ = sleeper.sleep(duration) => true,
            _ = self.disposed() => {
                trace!("sleep interrupted by disposal");
                false
            }
        }
    }
}
