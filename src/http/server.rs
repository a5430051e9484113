//! HTTP server implementation.
//

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

use crate::config::{Config, ConfigTrait};
use crate::controller::controller::Controller;

/// Server trait for HTTP server operations.
#[async_trait::async_trait]
pub trait Server: Send + Sync {
    /// Starts the server (blocking).
    async fn listen_and_serve(&self) -> Result<()>;
}

/// HTTP server implementation.
pub struct HttpServer {
    shutdown_token: CancellationToken,
    config: Config,
    router: Router,
}

impl HttpServer {
    /// Creates a new HTTP server.
    pub fn new(
        shutdown_token: CancellationToken,
        config: Config,
        controllers: Vec<Box<dyn Controller>>,
    ) -> Arc<Self> {
        let router = Self::build_router(controllers);

        Arc::new(Self {
            shutdown_token,
            config,
            router,
        })
    }

    /// Returns a handle to the assembled router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    fn addr(&self) -> Result<SocketAddr> {
        let port = self.config.port().trim_start_matches(':');
        format!("0.0.0.0:{}", port)
            .parse()
            .context("Failed to parse server address")
    }

    /// Serves on an already bound listener until the shutdown token fires.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let name = self
            .config
            .api()
            .and_then(|api| api.name.as_deref())
            .unwrap_or("aliveness");
        let local_addr = listener.local_addr().ok();

        info!(
            component = "server",
            event = "started",
            name = name,
            addr = ?local_addr,
            "server started"
        );

        let shutdown_token = self.shutdown_token.clone();
        let serve_future =
            axum::serve(listener, self.router.clone()).with_graceful_shutdown(async move {
                shutdown_token.cancelled().await;
            });

        if let Err(e) = serve_future.await {
            error!(
                component = "server",
                event = "listen_and_serve_failed",
                name = name,
                addr = ?local_addr,
                error = %e,
                "server failed to listen and serve"
            );
            return Err(e.into());
        }

        info!(
            component = "server",
            event = "stopped",
            name = name,
            addr = ?local_addr,
            "server stopped"
        );

        Ok(())
    }

    /// Builds the router with all controllers.
    fn build_router(controllers: Vec<Box<dyn Controller>>) -> Router {
        let router = controllers
            .iter()
            .fold(Router::new(), |router, controller| controller.add_route(router));

        router.layer(TimeoutLayer::new(Duration::from_secs(30)))
    }
}

#[async_trait::async_trait]
impl Server for HttpServer {
    async fn listen_and_serve(&self) -> Result<()> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind TCP listener on {}", addr))?;
        self.serve(listener).await
    }
}
