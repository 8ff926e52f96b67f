//! User-facing HTTP server.
//!
//! # Responsibilities
//! - Accept requests and hand them to the currently published Multiplexer
//! - Wire up middleware (tracing, body limit)
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - Each request loads the multiplexer once and keeps that `Arc` to the end,
//!   so route changes never affect requests already in flight

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::routing::Multiplexer;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub multiplexer: Arc<ArcSwap<Multiplexer>>,
}

/// The server that runs user routes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server dispatching through `multiplexer`.
    pub fn new(multiplexer: Arc<ArcSwap<Multiplexer>>, max_body_size: usize) -> Self {
        let state = AppState { multiplexer };
        Self {
            router: Self::build_router(state, max_body_size),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState, max_body_size: usize) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(max_body_size)),
            )
    }

    /// The router, for serving or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        serve("user", listener, self.router, shutdown).await
    }
}

/// Serve any router on `listener` with graceful shutdown.
pub async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(server = name, address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!(server = name, "HTTP server stopped");
    Ok(())
}

/// Dispatch through whichever multiplexer is published right now.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mux = state.multiplexer.load_full();
    mux.dispatch(request).await
}
