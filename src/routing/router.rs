//! Route compilation and dispatch.
//!
//! # Responsibilities
//! - Compile a route snapshot plus a handler factory into a `Multiplexer`
//! - Look up the handler for a request by method and path
//! - Return explicit 404/405 when nothing matches
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First registered match wins, in snapshot order
//! - A path match with no method match yields 405, not 404
//! - Uncompilable routes are skipped with a warning; building never fails
//! - Republishing is the caller's job (see `admin::RouteService`)

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;

use crate::routing::matcher::{parse_method, PathParams, PathPattern};
use crate::routing::route::{Route, RoutingError};

/// A per-route request handler produced by a handler factory.
pub type RequestHandler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// One compiled `(pattern, method) -> handler` registration.
struct Entry {
    route_id: String,
    method: Method,
    pattern: PathPattern,
    handler: RequestHandler,
}

/// Outcome of resolving a request against a multiplexer.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A route matched; carries its id and the captured variables.
    Matched { route_id: String, params: PathParams },
    /// Some pattern matched the path but none accepted the method.
    MethodNotAllowed,
    /// No pattern matched the path.
    NotFound,
}

/// Immutable compiled dispatch table.
#[derive(Default)]
pub struct Multiplexer {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|e| (e.method.as_str(), e.pattern.as_str())),
            )
            .finish()
    }
}

/// Check that a route would compile into a multiplexer entry.
pub fn validate_route(route: &Route) -> Result<(), RoutingError> {
    parse_method(&route.method)?;
    PathPattern::parse(&route.pattern)?;
    Ok(())
}

/// Build a fresh multiplexer from a route snapshot.
///
/// Routes are registered in the given order; no route is looked up by id.
pub fn build<F>(routes: &[Route], mut handler_factory: F) -> Multiplexer
where
    F: FnMut(Route) -> RequestHandler,
{
    let mut entries = Vec::with_capacity(routes.len());

    for route in routes {
        let compiled = parse_method(&route.method)
            .and_then(|method| PathPattern::parse(&route.pattern).map(|p| (method, p)));

        match compiled {
            Ok((method, pattern)) => entries.push(Entry {
                route_id: route.id.clone(),
                method,
                pattern,
                handler: handler_factory(route.clone()),
            }),
            Err(e) => {
                tracing::warn!(route_id = %route.id, error = %e, "Skipping route that does not compile");
            }
        }
    }

    tracing::debug!(routes = entries.len(), "Multiplexer built");
    Multiplexer { entries }
}

impl Multiplexer {
    /// Multiplexer with no routes; every request gets 404.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of compiled entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, method: &Method, path: &str) -> Result<(&Entry, PathParams), Resolution> {
        let mut path_matched = false;
        for entry in &self.entries {
            if let Some(params) = entry.pattern.captures(path) {
                if entry.method == *method {
                    return Ok((entry, params));
                }
                path_matched = true;
            }
        }
        if path_matched {
            Err(Resolution::MethodNotAllowed)
        } else {
            Err(Resolution::NotFound)
        }
    }

    /// Resolve a method and path without running any handler.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
        match self.find(method, path) {
            Ok((entry, params)) => Resolution::Matched {
                route_id: entry.route_id.clone(),
                params,
            },
            Err(resolution) => resolution,
        }
    }

    /// Route a request to its handler.
    ///
    /// Captured path variables are attached as a `PathParams` extension.
    pub async fn dispatch(&self, mut request: Request<Body>) -> Response {
        let path = request.uri().path().to_string();
        match self.find(request.method(), &path) {
            Ok((entry, params)) => {
                tracing::debug!(route_id = %entry.route_id, path = %path, "Route matched");
                request.extensions_mut().insert(params);
                (entry.handler)(request).await
            }
            Err(Resolution::MethodNotAllowed) => {
                tracing::debug!(method = %request.method(), path = %path, "Method not allowed");
                StatusCode::METHOD_NOT_ALLOWED.into_response()
            }
            Err(_) => {
                tracing::debug!(path = %path, "No route matched");
                (StatusCode::NOT_FOUND, "No matching route found").into_response()
            }
        }
    }
}
