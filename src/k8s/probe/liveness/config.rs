// Package liveness provides configuration for liveness probes.
//

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default upper bound of a stack dump emitted on failure (12 MiB).
pub const DEFAULT_DUMP_LIMIT: usize = 12 * 1024 * 1024;

const DEFAULT_TIMEOUT: &str = "5s";

/// Configuration for liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Timeout duration as a string (e.g., "5s", "10ms").
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Max bytes of stack dump text logged when a service is not alive.
    #[serde(default = "default_dump_limit")]
    pub dump_limit: usize,
}

fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

fn default_dump_limit() -> usize {
    DEFAULT_DUMP_LIMIT
}

impl Config {
    /// Creates a new config with default timeout and dump limit.
    pub fn new() -> Self {
        Self {
            timeout: default_timeout(),
            dump_limit: default_dump_limit(),
        }
    }

    /// Parses and returns the liveness timeout duration.
    pub fn liveness_timeout(&self) -> Duration {
        humantime::parse_duration(&self.timeout).unwrap_or_else(|err| {
            warn!(
                component = "liveness",
                event = "config_timeout_invalid",
                error = %err,
                timeout = %self.timeout,
                "Failed to parse liveness probe timeout, using default: 5s"
            );
            Duration::from_secs(5)
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
