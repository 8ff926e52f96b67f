//! Route administration: mutate the table, rebuild, publish.
//!
//! # Responsibilities
//! - Own the RouteTable and the published Multiplexer
//! - Rebuild from a fresh snapshot after every mutation
//! - Publish atomically so requests never see a partial table
//!
//! # Design Decisions
//! - Publishing is a pointer swap (`ArcSwap::store`)
//! - Rebuild + publish run under one mutex, so the last mutation's
//!   snapshot is the one left published
//! - Routes are validated before they enter the table

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::observability::metrics;
use crate::routing::{self, Multiplexer, Route, RouteTable, RoutingError};

/// A route as submitted to the admin API, before an id is assigned.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct NewRoute {
    pub method: String,
    pub url_pattern: String,
    #[serde(default)]
    pub entrypoint: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub debug: bool,
}

/// The admin collaborator of the routing core.
pub struct RouteService {
    table: RouteTable,
    dispatcher: Dispatcher,
    published: Arc<ArcSwap<Multiplexer>>,
    rebuild_lock: Mutex<()>,
}

impl RouteService {
    /// Create a service with an empty table and an empty multiplexer.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            table: RouteTable::new(),
            dispatcher,
            published: Arc::new(ArcSwap::from_pointee(Multiplexer::empty())),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Handle the user server loads multiplexers from.
    pub fn multiplexer(&self) -> Arc<ArcSwap<Multiplexer>> {
        self.published.clone()
    }

    /// Add a route with a generated id.
    pub fn create(&self, new: NewRoute) -> Result<Route, RoutingError> {
        let route = Route {
            id: Uuid::new_v4().to_string(),
            method: new.method,
            pattern: new.url_pattern,
            entrypoint: new.entrypoint,
            command: new.command,
            debug: new.debug,
            index: 0,
        };
        self.append(route)
    }

    /// Append a route whose id the caller chose, returning it with its
    /// position.
    pub fn append(&self, route: Route) -> Result<Route, RoutingError> {
        routing::validate_route(&route)?;
        let position = self.table.append_unique(route.clone())?;
        tracing::info!(
            route_id = %route.id,
            method = %route.method,
            pattern = %route.pattern,
            index = position.index,
            "Route appended"
        );
        self.rebuild();
        Ok(Route {
            index: position.index,
            ..route
        })
    }

    /// Remove a route by id.
    pub fn delete(&self, id: &str) -> Result<(), RoutingError> {
        self.table.delete(id)?;
        tracing::info!(route_id = %id, "Route deleted");
        self.rebuild();
        Ok(())
    }

    /// Routes with their current positions.
    pub fn list(&self) -> Vec<Route> {
        self.table.list()
    }

    pub fn get(&self, id: &str) -> Option<Route> {
        self.table.get(id)
    }

    /// Recompile the multiplexer from the current table and publish it.
    pub fn rebuild(&self) {
        let _guard = self.rebuild_lock.lock();
        let snapshot = self.table.snapshot();
        let mux = routing::build(&snapshot, |route| self.dispatcher.handler_for(route));
        metrics::record_route_count(snapshot.len());
        tracing::debug!(routes = mux.len(), "Publishing multiplexer");
        self.published.store(Arc::new(mux));
    }
}
