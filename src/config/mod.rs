// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::liveness;

pub const PROD: &str = "prod";
pub const DEV: &str = "dev";
pub const TEST: &str = "test";

const DEFAULT_PORT: &str = "8020";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Aliveness {
    #[serde(rename = "aliveness")]
    pub aliveness: AlivenessBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlivenessBox {
    #[serde(default = "default_env")]
    pub env: String,
    pub logs: Option<Logs>,
    pub api: Option<Api>,
    pub k8s: Option<K8S>,
    #[serde(default)]
    pub workers: Vec<Worker>,
}

fn default_env() -> String {
    DEV.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Api {
    pub name: Option<String>,
    pub port: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct K8S {
    #[serde(default)]
    pub probe: liveness::Config,
}

/// A sync loop registered as a liveness service by the binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Worker {
    pub name: String,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    #[serde(rename = "max_silence", with = "humantime_serde")]
    pub max_silence: Duration,
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    fn api(&self) -> Option<&Api>;
    fn port(&self) -> &str;
    fn probe(&self) -> liveness::Config;
    fn workers(&self) -> &[Worker];
}

// Config type alias for convenience
pub type Config = Aliveness;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.aliveness.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.aliveness.env == PROD
    }

    fn api(&self) -> Option<&Api> {
        self.aliveness.api.as_ref()
    }

    fn port(&self) -> &str {
        self.api()
            .and_then(|api| api.port.as_deref())
            .unwrap_or(DEFAULT_PORT)
    }

    fn probe(&self) -> liveness::Config {
        self.aliveness
            .k8s
            .as_ref()
            .map(|k8s| k8s.probe.clone())
            .unwrap_or_default()
    }

    fn workers(&self) -> &[Worker] {
        &self.aliveness.workers
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::from_yaml(&data).with_context(|| format!("unmarshal yaml from {:?}", abs_path))
    }

    /// Parses and validates configuration from YAML text.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(data)?;

        for worker in &cfg.aliveness.workers {
            if worker.name.is_empty() {
                anyhow::bail!("worker name must not be empty");
            }
            if worker.interval.is_zero() {
                anyhow::bail!("worker {:?}: interval must be positive", worker.name);
            }
        }

        Ok(cfg)
    }
}

// Test config is always available for integration tests
mod test_config;
#[allow(dead_code)]
pub use test_config::new_test_config;
