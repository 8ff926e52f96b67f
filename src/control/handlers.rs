use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::control::ControlState;
use crate::handlers::Handler;

fn lookup(state: &ControlState, id: &str) -> Result<Arc<Handler>, Response> {
    state.registry.get(id).ok_or_else(|| {
        tracing::debug!(handler_id = %id, "Control request for unknown handler");
        (StatusCode::NOT_FOUND, "Handler not found").into_response()
    })
}

fn text(value: impl Into<String>) -> Response {
    (StatusCode::OK, value.into()).into_response()
}

fn not_found(what: &'static str) -> Response {
    (StatusCode::NOT_FOUND, what).into_response()
}

pub async fn list_handlers(State(state): State<ControlState>) -> Json<Vec<String>> {
    Json(state.registry.list_ids())
}

pub async fn get_request_field(
    State(state): State<ControlState>,
    Path((id, field)): Path<(String, String)>,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    let request = &handler.request;

    match field.as_str() {
        "method" => text(request.method().as_str()),
        "path" => text(request.uri().path()),
        "query" => text(request.uri().query().unwrap_or_default()),
        "host" => text(request.host().unwrap_or_default()),
        "version" => text(format!("{:?}", request.version())),
        _ => not_found("Unknown request field"),
    }
}

pub async fn get_request_match(
    State(state): State<ControlState>,
    Path((id, name)): Path<(String, String)>,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    match handler.request.path_params().and_then(|p| p.get(&name)) {
        Some(value) => text(value),
        None => not_found("No such path variable"),
    }
}

pub async fn get_request_param(
    State(state): State<ControlState>,
    Path((id, name)): Path<(String, String)>,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    let query = handler.request.uri().query().unwrap_or_default();
    let value = url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.into_owned());
    match value {
        Some(value) => text(value),
        None => not_found("No such query parameter"),
    }
}

pub async fn get_request_header(
    State(state): State<ControlState>,
    Path((id, name)): Path<(String, String)>,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    match handler.request.headers().get(name.as_str()) {
        Some(value) => (StatusCode::OK, value.as_bytes().to_vec()).into_response(),
        None => not_found("No such header"),
    }
}

pub async fn get_request_body(
    State(state): State<ControlState>,
    Path(id): Path<String>,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    let Some(body) = handler.request.take_body() else {
        return (StatusCode::OK, Bytes::new()).into_response();
    };
    match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => (StatusCode::OK, bytes).into_response(),
        Err(e) => {
            tracing::warn!(handler_id = %id, error = %e, "Failed to read request body");
            (StatusCode::BAD_REQUEST, "Failed to read request body").into_response()
        }
    }
}

pub async fn set_response_status(
    State(state): State<ControlState>,
    Path(id): Path<String>,
    body: String,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    let status = body
        .trim()
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok());
    match status {
        Some(status) => {
            handler.writer.set_status(status);
            StatusCode::OK.into_response()
        }
        None => (StatusCode::BAD_REQUEST, "Invalid status code").into_response(),
    }
}

pub async fn add_response_header(
    State(state): State<ControlState>,
    Path((id, name)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    let name = HeaderName::from_bytes(name.as_bytes());
    let value = HeaderValue::from_bytes(&body);
    match (name, value) {
        (Ok(name), Ok(value)) => {
            handler.writer.append_header(name, value);
            StatusCode::OK.into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "Invalid header").into_response(),
    }
}

pub async fn write_response_body(
    State(state): State<ControlState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let handler = match lookup(&state, &id) {
        Ok(h) => h,
        Err(resp) => return resp,
    };
    handler.writer.write(&body);
    StatusCode::OK.into_response()
}
