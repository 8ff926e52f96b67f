//! Script-facing control API.
//!
//! # Data Flow
//! ```text
//! Spawned process (PROCMUX_HANDLER_ID, PROCMUX_CONTROL_URL)
//!     → GET  /handlers/{id}/request/...   reads the inbound request
//!     → PUT  /handlers/{id}/response/...  builds the outbound response
//!     → HandlerRegistry lookup by id (404 once deregistered)
//! ```
//!
//! # Design Decisions
//! - Plain-text values, raw bytes for bodies
//! - The request body can be read once; later reads are empty
//! - Response headers accumulate; status and body are last-write / append

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};

use crate::handlers::HandlerRegistry;
use self::handlers::*;

/// Shared state for control handlers.
#[derive(Clone)]
pub struct ControlState {
    pub registry: HandlerRegistry,
    pub max_body_size: usize,
}

pub fn setup_control_router(state: ControlState) -> Router {
    let body_limit = state.max_body_size;
    Router::new()
        .route("/handlers", get(list_handlers))
        .route("/handlers/{id}/request/body", get(get_request_body))
        .route("/handlers/{id}/request/matches/{name}", get(get_request_match))
        .route("/handlers/{id}/request/params/{name}", get(get_request_param))
        .route("/handlers/{id}/request/headers/{name}", get(get_request_header))
        .route("/handlers/{id}/request/{field}", get(get_request_field))
        .route("/handlers/{id}/response/status", put(set_response_status))
        .route("/handlers/{id}/response/headers/{name}", put(add_response_header))
        .route("/handlers/{id}/response/body", put(write_response_body))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
