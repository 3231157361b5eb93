//! Solace Server - HTTP API server.
//!
//! This crate exposes the emergency classifier, the demo chat, and the
//! dashboard directory over JSON.
//!
//! ## Endpoints
//!
//! - `POST /api/classify` - Check text for emergency language
//! - `GET /api/taxonomy` - List categories and trigger phrases
//! - `POST /api/chats` - Start a demo chat
//! - `GET /api/chats` - List chats
//! - `GET /api/chats/emergency` - List chats flagged as emergencies
//! - `GET /api/chats/{id}` - Get one chat
//! - `DELETE /api/chats/{id}` - Close a chat that was never flagged
//! - `POST /api/chats/{id}/messages` - Send a message to the assistant
//! - `GET|POST /api/counselors`, `PUT|DELETE /api/counselors/{id}`
//! - `GET|POST /api/resources`, `PUT|DELETE /api/resources/{id}`
//! - `GET /api/stats` - Dashboard counts
//!
//! ## Example
//!
//! ```no_run
//! use solace_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::new(ServerConfig::default()).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod error;
mod handlers;
pub mod models;
pub mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::routing::{get, post, put};
use axum::Router;
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use solace_core::classifier::{EmergencyClassifier, MatchMode, Taxonomy, TaxonomyError};

pub use error::{ApiError, Result};
pub use state::AppState;

/// Default server port.
pub const DEFAULT_PORT: u16 = 48780;

/// Default server host (localhost only).
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default number of chats kept before idle demo chats are pruned.
pub const DEFAULT_MAX_CHATS: usize = 1000;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1).
    pub host: String,
    /// Port to bind to (default: 48780).
    pub port: u16,
    /// Taxonomy JSON file (None = built-in taxonomy).
    pub taxonomy_path: Option<PathBuf>,
    /// How phrases are matched.
    pub match_mode: MatchMode,
    /// Chats kept before idle demo chats are pruned (default: 1000).
    pub max_chats: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            taxonomy_path: None,
            match_mode: MatchMode::Substring,
            max_chats: DEFAULT_MAX_CHATS,
        }
    }
}

impl ServerConfig {
    /// Sets the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Loads the taxonomy from a JSON file instead of the built-in one.
    pub fn with_taxonomy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.taxonomy_path = Some(path.into());
        self
    }

    /// Sets the match mode.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Sets how many chats are kept before idle demo chats are pruned.
    pub fn with_max_chats(mut self, max_chats: usize) -> Self {
        self.max_chats = max_chats;
        self
    }

    /// Builds the classifier this configuration describes.
    pub fn build_classifier(&self) -> std::result::Result<EmergencyClassifier, TaxonomyError> {
        match (&self.taxonomy_path, self.match_mode) {
            (None, MatchMode::Substring) => Ok(EmergencyClassifier::new()),
            (None, mode) => EmergencyClassifier::with_taxonomy(Taxonomy::builtin(), mode),
            (Some(path), mode) => {
                EmergencyClassifier::with_taxonomy(Taxonomy::from_path(path)?, mode)
            }
        }
    }
}

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("failed to bind to {0}: {1}")]
    BindError(SocketAddr, std::io::Error),

    /// Taxonomy could not be loaded.
    #[error("taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    /// Server runtime error.
    #[error("server error: {0}")]
    Runtime(String),
}

/// Builds the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/classify", post(handlers::classify))
        .route("/api/taxonomy", get(handlers::get_taxonomy))
        .route("/api/chats", get(handlers::list_chats).post(handlers::start_chat))
        .route("/api/chats/emergency", get(handlers::emergency_chats))
        .route(
            "/api/chats/{id}",
            get(handlers::get_chat).delete(handlers::close_chat),
        )
        .route("/api/chats/{id}/messages", post(handlers::send_message))
        .route(
            "/api/counselors",
            get(handlers::list_counselors).post(handlers::create_counselor),
        )
        .route(
            "/api/counselors/{id}",
            put(handlers::update_counselor).delete(handlers::delete_counselor),
        )
        .route(
            "/api/resources",
            get(handlers::list_resources).post(handlers::create_resource),
        )
        .route(
            "/api/resources/{id}",
            put(handlers::update_resource).delete(handlers::delete_resource),
        )
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}

/// The HTTP API server.
pub struct Server {
    router: Router,
    addr: SocketAddr,
}

impl Server {
    /// Creates a new server with the given configuration.
    pub fn new(config: ServerConfig) -> std::result::Result<Self, ServerError> {
        let classifier = config.build_classifier()?;
        let state = AppState::new(classifier).with_max_chats(config.max_chats);
        Self::with_state(config, state)
    }

    /// Creates a server with custom application state.
    pub fn with_state(
        config: ServerConfig,
        state: AppState,
    ) -> std::result::Result<Self, ServerError> {
        // Dashboard front-ends are served from other origins
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = router(state).layer(cors);

        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ServerError::Runtime(format!("invalid address: {}", e)))?;

        Ok(Self { router, addr })
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs the server until Ctrl+C.
    pub async fn run(self) -> std::result::Result<(), ServerError> {
        info!("Starting Solace API server on {}", self.addr);

        let domain = if self.addr.is_ipv6() {
            Domain::IPV6
        } else {
            Domain::IPV4
        };
        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        // Allow quick restarts while old sockets sit in TIME_WAIT
        socket
            .set_reuse_address(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        socket
            .bind(&self.addr.into())
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .listen(128)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        // Set non-blocking for tokio
        socket
            .set_nonblocking(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        let std_listener: std::net::TcpListener = socket.into();
        let listener = tokio::net::TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Runtime(e.to_string()))?;

        info!("Solace API server stopped");
        Ok(())
    }

    /// Returns the router for testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
