//! Cooperative waiting for a session to finish.

use crate::session::{Session, Verbosity};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// How often [`TokioPump`] hands control back to the runtime.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The host's "process pending events and return" primitive.
#[async_trait]
pub trait HostPump: Send + Sync {
    async fn process_pending(&self);
}

/// Yields to the tokio runtime for one poll interval.
#[derive(Debug, Clone, Copy)]
pub struct TokioPump {
    pub interval: Duration,
}

impl Default for TokioPump {
    fn default() -> Self {
        TokioPump {
            interval: POLL_INTERVAL,
        }
    }
}

#[async_trait]
impl HostPump for TokioPump {
    async fn process_pending(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

impl Session {
    /// Wait until the session leaves `InProgress` or `timeout` elapses.
    ///
    /// `None` waits without limit. Returns the end reason at wake-up, which is
    /// empty if the caller's timeout expired while capture was still running.
    pub async fn wait(&self, timeout: Option<Duration>) -> String {
        self.wait_with(&TokioPump::default(), timeout).await
    }

    /// [`Session::wait`] using a custom host pump between polls.
    pub async fn wait_with(&self, pump: &dyn HostPump, timeout: Option<Duration>) -> String {
        // A session started outside the runtime has no alarm yet.
        self.ensure_timer();
        // A timeout past the clock's range waits without limit.
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        while self.in_progress() && deadline.is_none_or(|deadline| Instant::now() < deadline) {
            pump.process_pending().await;
        }
        self.end_reason(Verbosity::Kind)
    }
}
