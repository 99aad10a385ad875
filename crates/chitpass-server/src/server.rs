//! `ChitpassServer` builder and accept loop.
//!
//! This is the entry point for running the game server. It ties the
//! layers together: transport (room-scoped WebSocket connections) →
//! protocol (JSON codec) → registry (one actor per room) → room (game
//! rules).

use std::sync::Arc;

use chitpass_protocol::JsonCodec;
use chitpass_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::registry::RoomRegistry;
use crate::ServerError;

/// Builder for configuring and starting a chitpass server.
///
/// # Example
///
/// ```rust,ignore
/// use chitpass_server::ChitpassServerBuilder;
///
/// let server = ChitpassServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ChitpassServerBuilder {
    bind_addr: String,
}

impl ChitpassServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self { bind_addr: "127.0.0.1:8080".to_string() }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<ChitpassServer, ServerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        Ok(ChitpassServer {
            transport,
            registry: Arc::new(RoomRegistry::new()),
            codec: JsonCodec,
        })
    }
}

impl Default for ChitpassServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running chitpass game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ChitpassServer {
    transport: WebSocketTransport,
    registry: Arc<RoomRegistry>,
    codec: JsonCodec,
}

impl ChitpassServer {
    /// Creates a new builder.
    pub fn builder() -> ChitpassServerBuilder {
        ChitpassServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// A rejected upgrade (wrong path) only costs that one connection;
    /// the loop keeps accepting. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("chitpass server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let registry = Arc::clone(&self.registry);
                    let codec = self.codec;
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, registry, codec).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
