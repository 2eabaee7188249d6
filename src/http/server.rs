//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: `/api/*` dispatcher plus static fallback
//! - Wire up middleware (CORS, request ID, tracing)
//! - Serve on a listener until the shutdown signal fires
//!
//! Each connection runs on its own task, so a button hold in one request
//! does not delay any other request.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::api::{api_handler, not_found};
use crate::http::cors::cors_middleware;
use crate::tv::TvProxy;
use crate::xbox::XboxBridge;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub tv: Arc<TvProxy>,
    pub xbox: Arc<XboxBridge>,
    pub static_files: Option<ServeDir>,
}

impl AppState {
    pub fn from_config(config: &RelayConfig) -> Self {
        let static_files = config
            .static_files
            .enabled
            .then(|| ServeDir::new(Path::new(&config.static_files.root)));

        Self {
            tv: Arc::new(TvProxy::new(&config.tv)),
            xbox: Arc::new(XboxBridge::udp(config.xbox.clone())),
            static_files,
        }
    }
}

/// HTTP front door for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        let state = AppState::from_config(&config);
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/api/", any(api_handler))
            .route("/api/{*path}", any(api_handler))
            .fallback(static_fallback)
            .with_state(state)
            .layer(middleware::from_fn(cors_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for in-process use without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            tv = %self.config.tv.base_url(),
            xbox = %self.config.xbox.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Everything outside `/api`: files from the static root for GET/HEAD.
async fn static_fallback(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(files) = state.static_files.clone() else {
        return not_found();
    };
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return not_found();
    }

    match files.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(infallible) => match infallible {},
    }
}
