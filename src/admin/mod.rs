//! Route administration subsystem.
//!
//! # Data Flow
//! ```text
//! Admin request (list / create / get / delete)
//!     → auth.rs (optional bearer token)
//!     → handlers.rs
//!     → service.rs (RouteTable mutation → rebuild → publish)
//! ```

pub mod auth;
pub mod handlers;
pub mod service;

use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use crate::handlers::HandlerRegistry;
use self::auth::admin_auth_middleware;
use self::handlers::*;

pub use service::{NewRoute, RouteService};

/// Shared state for admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub routes: Arc<RouteService>,
    pub handlers: HandlerRegistry,
    pub api_key: Option<String>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/routes", get(list_routes).post(create_route))
        .route("/routes/{id}", get(get_route).delete(delete_route))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
