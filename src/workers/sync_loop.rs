// Package workers provides periodic sync loops that report liveness.

use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Worker;
use crate::liveness::{Heartbeat, Registry};

/// A named loop that beats its heartbeat on every tick until cancelled.
pub struct SyncLoop {
    name: String,
    cfg: Worker,
    heartbeat: Arc<Heartbeat>,
}

impl SyncLoop {
    /// Creates the loop and registers its heartbeat under the worker name.
    pub fn new(registry: &Registry, cfg: Worker) -> Self {
        let heartbeat = Arc::new(Heartbeat::new(cfg.max_silence));
        registry.add(cfg.name.clone(), heartbeat.clone());
        Self {
            name: cfg.name.clone(),
            cfg,
            heartbeat,
        }
    }

    pub fn heartbeat(&self) -> Arc<Heartbeat> {
        self.heartbeat.clone()
    }

    /// Runs until `shutdown_token` is cancelled.
    pub async fn run(self, shutdown_token: CancellationToken) {
        let mut interval = tokio::time::interval(self.cfg.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            component = "worker",
            event = "started",
            worker = %self.name,
            interval = ?self.cfg.interval,
            max_silence = ?self.cfg.max_silence,
            "sync loop started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.heartbeat.beat();
                    debug!(component = "worker", event = "synced", worker = %self.name);
                }
                _ = shutdown_token.cancelled() => {
                    info!(
                        component = "worker",
                        event = "stopped",
                        worker = %self.name,
                        "sync loop stopped"
                    );
                    break;
                }
            }
        }
    }
}

/// Registers and spawns one sync loop per configured worker.
pub fn spawn_all(
    shutdown_token: CancellationToken,
    registry: &Registry,
    workers: &[Worker],
) -> JoinSet<()> {
    let mut set = JoinSet::new();
    for cfg in workers {
        let sync_loop = SyncLoop::new(registry, cfg.clone());
        set.spawn(sync_loop.run(shutdown_token.clone()));
    }
    set
}
