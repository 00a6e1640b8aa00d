//! Broadcast server listener
//!
//! Binds the listening port, starts the sender loop, and serves the route
//! table until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::error::Result;
use crate::hub::{BroadcastHub, HubConfig};
use crate::server::config::ServerConfig;
use crate::server::routes;

/// Broadcast server
///
/// Owns the hub and the listening configuration. All state is in-memory:
/// the registry and queue reset on process start.
pub struct BroadcastServer {
    config: ServerConfig,
    hub: Arc<BroadcastHub>,
}

impl BroadcastServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self::with_hub_config(config, HubConfig::default())
    }

    /// Create a new server with custom hub configuration
    pub fn with_hub_config(config: ServerConfig, hub_config: HubConfig) -> Self {
        Self {
            config,
            hub: Arc::new(BroadcastHub::with_config(hub_config)),
        }
    }

    /// Get a reference to the broadcast hub
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// Binds the configured address and serves forever. A bind failure is
    /// the only fatal error and propagates to the caller.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Broadcast server listening");

        let _sender_handle = self.hub.spawn_sender_loop()?;

        self.serve_routes(listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Broadcast server listening");

        let sender_handle = self.hub.spawn_sender_loop()?;

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.serve_routes(listener) => result,
        };

        // Stop the sender loop on shutdown
        sender_handle.abort();

        result
    }

    /// Serve on a pre-bound listener
    ///
    /// Useful when the caller needs the actual bound address, e.g. after
    /// binding port 0.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let _sender_handle = self.hub.spawn_sender_loop()?;

        self.serve_routes(listener).await
    }

    async fn serve_routes(&self, listener: TcpListener) -> Result<()> {
        axum::serve(listener, routes::router(Arc::clone(&self.hub))).await?;
        Ok(())
    }
}
