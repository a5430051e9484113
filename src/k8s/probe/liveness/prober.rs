// Package liveness provides the Prober trait for liveness checking.

use std::sync::Arc;

use super::Service;

/// Prober can handle services/applications.
pub trait Prober: Send + Sync {
    /// Starts watching `service` under `name`, replacing any previous one.
    fn add(&self, name: &str, service: Arc<dyn Service>);

    /// Checks whether every watched service is alive (blocking).
    fn is_alive(&self) -> bool;
}
