//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with one catch-all handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Buffer the request body within the configured limit
//! - Hand each request to the front controller on the blocking pool
//! - Start the settings watcher and stop on shutdown

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{FrontConfig, SettingsWatcher};
use crate::front::Front;
use crate::http::request::{MakeRequestUuid, PublicRequest};
use crate::lifecycle::signals::shutdown_signal;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub front: Arc<Front>,
    pub max_body_size: usize,
}

/// Errors raised while serving.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("listener I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to watch the config file: {0}")]
    Watch(#[from] notify::Error),
}

/// HTTP server hosting the front controller.
pub struct HttpServer {
    router: Router,
    front: Arc<Front>,
    config_path: Option<PathBuf>,
}

impl HttpServer {
    pub fn new(config: &FrontConfig, front: Front) -> Self {
        let front = Arc::new(front);
        let state = AppState {
            front: front.clone(),
            max_body_size: config.listener.max_body_size,
        };
        let router = Self::build_router(config, state);
        Self {
            router,
            front,
            config_path: None,
        }
    }

    /// Reload blog settings whenever this file changes.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FrontConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(front_handler))
            .route("/", any(front_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn front(&self) -> &Arc<Front> {
        &self.front
    }

    /// Serve until Ctrl+C, SIGTERM or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        // Dropping the watcher stops it, so it lives as long as the server.
        let _watcher = match &self.config_path {
            Some(path) => Some(SettingsWatcher::new(path, self.front.settings()).run()?),
            None => None,
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffers the request and runs the front controller.
async fn front_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Rejected request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let req = PublicRequest::new(parts.method, parts.uri, parts.headers, body).with_peer(peer);
    let front = state.front.clone();
    match tokio::task::spawn_blocking(move || front.handle(&req)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Front controller task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
