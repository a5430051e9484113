// Package liveness provides Kubernetes liveness probe functionality.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::timeout;
use tracing::warn;

pub mod config;
pub mod error;
pub mod heartbeat;
pub mod prober;
pub mod registry;
pub mod service;


pub use config::Config;
pub use error::TimeoutIsTooShortError;
pub use heartbeat::Heartbeat;
pub use prober::Prober;
pub use registry::Registry;
pub use service::Service;

/// Liveness probe with a deadline, for async callers such as HTTP handlers.
///
/// The check itself is blocking and runs on tokio's blocking pool. When the
/// deadline passes the probe answers `false`, but the check in flight is not
/// interrupted and still holds the registry lock until it returns.
///
/// At most one blocking check runs at a time. Callers arriving while it is
/// in flight wait on it, so a hung service costs one pooled thread, not one
/// per probe request.
#[derive(Clone)]
pub struct Probe {
    prober: Arc<dyn Prober>,
    timeout: Duration,
    in_flight: Arc<Mutex<Option<JoinHandle<bool>>>>,
}

impl Probe {
    /// Creates a new liveness probe
    pub fn new(prober: Arc<dyn Prober>, timeout_duration: Duration) -> Self {
        const MIN_TIMEOUT: Duration = Duration::from_millis(1);
        let timeout = if timeout_duration < MIN_TIMEOUT {
            warn!(
                component = "liveness",
                event = "timeout_clamped",
                error = %TimeoutIsTooShortError,
                "min timeout duration is 1ms (timeout set up as 10ms as a more reasonable value)"
            );
            Duration::from_millis(10)
        } else {
            timeout_duration
        };

        Self {
            prober,
            timeout,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks if every watched service is alive (async version)
    pub async fn is_alive_async(&self) -> bool {
        match timeout(self.timeout, self.check()).await {
            Ok(Ok(alive)) => alive,
            Ok(Err(err)) => {
                warn!(
                    component = "liveness",
                    event = "check_failed",
                    error = %err,
                    "liveness check task failed"
                );
                false
            }
            Err(_) => {
                warn!(
                    component = "liveness",
                    event = "deadline_exceeded",
                    timeout = ?self.timeout,
                    "liveness probe deadline exceeded while checking services"
                );
                false
            }
        }
    }

    /// Joins the check in flight, starting one if there is none. A check
    /// abandoned by a timed out caller stays in the slot for the next one.
    async fn check(&self) -> Result<bool, JoinError> {
        let mut in_flight = self.in_flight.lock().await;

        if in_flight.as_ref().is_some_and(|handle| handle.is_finished()) {
            // Finished after its callers gave up; the answer is stale.
            *in_flight = None;
        }

        let handle = in_flight.get_or_insert_with(|| {
            let prober = self.prober.clone();
            tokio::task::spawn_blocking(move || prober.is_alive())
        });
        let result = handle.await;
        *in_flight = None;
        result
    }
}
