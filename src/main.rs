// Main entrypoint for the aliveness probe server.

use aliveness::config::{Config, ConfigTrait};
use aliveness::controller::LivenessProbeController;
use aliveness::http::{HttpServer, Server};
use aliveness::liveness;
use aliveness::shutdown::GracefulShutdown;
use aliveness::workers;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const CONFIG_PATH: &str = "cfg/aliveness.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/aliveness.cfg.local.yaml";

/// Aliveness - liveness aggregation for long-running controller processes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    if let Some(custom_path) = path {
        let cfg = Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path))?;
        return Ok((cfg, custom_path));
    }

    match Config::load(CONFIG_PATH_LOCAL) {
        Ok(cfg) => Ok((cfg, PathBuf::from(CONFIG_PATH_LOCAL))),
        Err(_) => {
            let cfg = Config::load(CONFIG_PATH)
                .with_context(|| format!("failed to load config from {}", CONFIG_PATH))?;
            Ok((cfg, PathBuf::from(CONFIG_PATH)))
        }
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_deref())
        .unwrap_or("info");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (cfg, cfg_path) = load_cfg(args.cfg)?;

    // Logger depends on the loaded config.
    configure_logger(&cfg);
    info!(
        component = "config",
        event = "load_success",
        path = ?cfg_path,
        "config loaded"
    );

    let shutdown_token = CancellationToken::new();
    let graceful_shutdown =
        GracefulShutdown::new(shutdown_token.clone()).with_timeout(Duration::from_secs(60));

    let probe_cfg = cfg.probe();
    let registry = Arc::new(liveness::Registry::with_config(&probe_cfg));
    let probe = liveness::Probe::new(registry.clone(), probe_cfg.liveness_timeout());

    let mut sync_loops = workers::spawn_all(shutdown_token.clone(), &registry, cfg.workers());
    graceful_shutdown.add(1);
    let loops_done = graceful_shutdown.clone();
    tokio::task::spawn(async move {
        while sync_loops.join_next().await.is_some() {}
        loops_done.done();
    });

    let server = HttpServer::new(
        shutdown_token.clone(),
        cfg,
        vec![Box::new(LivenessProbeController::new(probe))],
    );
    graceful_shutdown.add(1);
    let server_done = graceful_shutdown.clone();
    let server_token = shutdown_token.clone();
    tokio::task::spawn(async move {
        if let Err(e) = server.listen_and_serve().await {
            error!(
                component = "main",
                scope = "server",
                event = "start_failed",
                error = %e,
                "failed to start server"
            );
            server_token.cancel();
        }
        server_done.done();
    });

    if let Err(e) = graceful_shutdown.await_shutdown().await {
        error!(
            component = "main",
            scope = "service",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down service"
        );
        return Err(e);
    }

    Ok(())
}
