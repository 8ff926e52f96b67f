use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::admin::service::NewRoute;
use crate::admin::AdminState;
use crate::routing::{Route, RoutingError};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub routes: usize,
    pub active_handlers: usize,
}

fn error_response(status: StatusCode, err: &RoutingError) -> Response {
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        routes: state.routes.list().len(),
        active_handlers: state.handlers.len(),
    })
}

pub async fn list_routes(State(state): State<AdminState>) -> Json<Vec<Route>> {
    Json(state.routes.list())
}

pub async fn create_route(
    State(state): State<AdminState>,
    Json(new_route): Json<NewRoute>,
) -> Response {
    match state.routes.create(new_route) {
        Ok(route) => (StatusCode::CREATED, Json(route)).into_response(),
        Err(e @ RoutingError::DuplicateRouteId(_)) => {
            tracing::warn!(error = %e, "Rejected route");
            error_response(StatusCode::CONFLICT, &e)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected route");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &e)
        }
    }
}

pub async fn get_route(State(state): State<AdminState>, Path(id): Path<String>) -> Response {
    match state.routes.get(&id) {
        Some(route) => Json(route).into_response(),
        None => error_response(StatusCode::NOT_FOUND, &RoutingError::RouteNotFound(id)),
    }
}

pub async fn delete_route(State(state): State<AdminState>, Path(id): Path<String>) -> Response {
    match state.routes.delete(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, &e),
    }
}
