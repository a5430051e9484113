use super::{AlivenessBox, Config};
use std::time::Duration;

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    Config {
        aliveness: AlivenessBox {
            env: super::TEST.to_string(),
            logs: Some(super::Logs {
                level: Some("debug".to_string()),
            }),
            api: Some(super::Api {
                name: Some("aliveness:8091".to_string()),
                port: Some("8091".to_string()),
            }),
            k8s: Some(super::K8S {
                probe: crate::liveness::Config {
                    timeout: "1s".to_string(),
                    dump_limit: 1 << 20,
                },
            }),
            workers: vec![super::Worker {
                name: "sync-loop".to_string(),
                interval: Duration::from_millis(10),
                max_silence: Duration::from_millis(200),
            }],
        },
    }
}
