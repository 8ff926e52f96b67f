//! Per-request handler lifecycle.
//!
//! # Responsibilities
//! - Generate a handler identity (500 if that fails, nothing else happens)
//! - Register the handler before the process starts
//! - Hand the spawner discarding or debug-forwarding output sinks
//! - Deregister the handler exactly once, whatever the spawn outcome
//!
//! # Design Decisions
//! - Dependencies are injected at construction; no global seams
//! - The lifecycle runs on its own task: a client going away does not cancel
//!   the process, and a panicking spawner cannot skip deregistration
//! - Spawn failures are logged and counted, never mapped to a status code;
//!   the response is whatever the process wrote, `200 OK` if nothing

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;

use crate::dispatch::output::{DebugSink, OutputSink, TracingSink};
use crate::handlers::{Handler, HandlerRegistry, IdGenerator, ResponseWriter, UuidGenerator};
use crate::observability::metrics;
use crate::routing::{RequestHandler, Route};
use crate::spawn::Spawner;

/// Builds request handlers that run matched requests through a spawner.
#[derive(Clone)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    ids: Arc<dyn IdGenerator>,
    spawner: Arc<dyn Spawner>,
    debug_sink: Arc<dyn DebugSink>,
}

impl Dispatcher {
    /// Create a dispatcher with UUID identities and a tracing debug sink.
    pub fn new(registry: HandlerRegistry, spawner: Arc<dyn Spawner>) -> Self {
        Self {
            registry,
            ids: Arc::new(UuidGenerator),
            spawner,
            debug_sink: Arc::new(TracingSink),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.debug_sink = sink;
        self
    }

    /// Handler factory for the multiplexer builder.
    pub fn handler_for(&self, route: Route) -> RequestHandler {
        let dispatcher = self.clone();
        let route = Arc::new(route);
        Arc::new(move |request: Request<Body>| -> BoxFuture<'static, Response> {
            let dispatcher = dispatcher.clone();
            let route = Route::clone(&route);
            Box::pin(async move { dispatcher.serve(route, request).await })
        })
    }

    /// Serve one request matched against `route`.
    pub async fn serve(&self, route: Route, request: Request<Body>) -> Response {
        let id = match self.ids.generate() {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(route_id = %route.id, error = %e, "Could not generate handler id");
                metrics::record_request(&route.id, "id_failure");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let writer = ResponseWriter::new();
        let handler = Arc::new(Handler::new(id.clone(), route, request, writer.clone()));

        let this = self.clone();
        if let Err(e) = tokio::spawn(async move { this.run(handler).await }).await {
            tracing::error!(handler_id = %id, error = %e, "Handler task aborted");
        }

        writer.take_response()
    }

    async fn run(&self, handler: Arc<Handler>) {
        self.registry.add(handler.clone());
        let _registration = Registration {
            registry: &self.registry,
            handler: &handler,
        };

        tracing::debug!(
            handler_id = %handler.id,
            route_id = %handler.route.id,
            method = %handler.request.method(),
            path = %handler.request.uri().path(),
            "Handler registered"
        );

        let (stdout, stderr) = if handler.route.debug {
            (
                OutputSink::forward_to(self.debug_sink.clone()),
                OutputSink::forward_to(self.debug_sink.clone()),
            )
        } else {
            (OutputSink::discard(), OutputSink::discard())
        };

        let started = Instant::now();
        let result = self.spawner.spawn(handler.clone(), stdout, stderr).await;
        metrics::record_spawn_duration(&handler.route.id, started);

        match result {
            Ok(()) => {
                metrics::record_request(&handler.route.id, "completed");
            }
            Err(e) => {
                tracing::error!(
                    handler_id = %handler.id,
                    route_id = %handler.route.id,
                    error = %e,
                    "Spawn failed"
                );
                metrics::record_request(&handler.route.id, "spawn_failure");
            }
        }
    }
}

/// Removes a handler from the registry when dropped.
///
/// Only this handler is removed; a different handler that reused the id
/// stays registered.
struct Registration<'a> {
    registry: &'a HandlerRegistry,
    handler: &'a Arc<Handler>,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.remove_handler(self.handler);
        tracing::debug!(handler_id = %self.handler.id, "Handler deregistered");
    }
}
