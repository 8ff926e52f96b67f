//! The per-request record shared with the spawned process.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode, Uri, Version},
    response::Response,
};
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

use crate::routing::{PathParams, Route};

/// An in-flight request, addressable by `id` while its process runs.
#[derive(Debug)]
pub struct Handler {
    /// Generated identity, unique per request.
    pub id: String,
    /// Copy of the route that matched.
    pub route: Route,
    /// The inbound request.
    pub request: HandlerRequest,
    /// The outbound response sink.
    pub writer: ResponseWriter,
}

impl Handler {
    pub fn new(id: String, route: Route, request: Request<Body>, writer: ResponseWriter) -> Self {
        Self {
            id,
            route,
            request: HandlerRequest::new(request),
            writer,
        }
    }
}

/// Inbound request: head is readable any number of times, body once.
pub struct HandlerRequest {
    parts: Parts,
    body: Mutex<Option<Body>>,
}

impl std::fmt::Debug for HandlerRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRequest")
            .field("parts", &self.parts)
            .field("body_taken", &self.body.lock().is_none())
            .finish()
    }
}

impl HandlerRequest {
    pub fn new(request: Request<Body>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body: Mutex::new(Some(body)),
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn version(&self) -> Version {
        self.parts.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Host the client addressed, from the URI authority or the Host header.
    pub fn host(&self) -> Option<&str> {
        self.parts
            .uri
            .host()
            .or_else(|| self.parts.headers.get("host").and_then(|h| h.to_str().ok()))
    }

    /// Variables captured by the route pattern.
    pub fn path_params(&self) -> Option<&PathParams> {
        self.parts.extensions.get::<PathParams>()
    }

    /// Take the request body. Returns `None` once it has been taken.
    pub fn take_body(&self) -> Option<Body> {
        self.body.lock().take()
    }
}

#[derive(Debug, Default)]
struct ResponseState {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

/// Response under construction, written by the spawned process through the
/// control API and sent once the process exits.
///
/// Clones share the same response. An untouched writer yields `200 OK` with
/// an empty body.
#[derive(Debug, Clone, Default)]
pub struct ResponseWriter {
    inner: Arc<Mutex<ResponseState>>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status: StatusCode) {
        self.inner.lock().status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.inner.lock().status
    }

    /// Add a header value, keeping any previous values for the same name.
    pub fn append_header(&self, name: HeaderName, value: HeaderValue) {
        self.inner.lock().headers.append(name, value);
    }

    pub fn headers(&self) -> HeaderMap {
        self.inner.lock().headers.clone()
    }

    /// Append bytes to the response body.
    pub fn write(&self, chunk: &[u8]) {
        self.inner.lock().body.extend_from_slice(chunk);
    }

    /// Body written so far.
    pub fn body(&self) -> Bytes {
        Bytes::copy_from_slice(&self.inner.lock().body)
    }

    /// Returns true if both writers share the same response.
    pub fn ptr_eq(&self, other: &ResponseWriter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Move the accumulated state out into an HTTP response, leaving the
    /// writer reset.
    pub fn take_response(&self) -> Response {
        let state = std::mem::take(&mut *self.inner.lock());
        let mut response = Response::new(Body::from(state.body.freeze()));
        *response.status_mut() = state.status;
        *response.headers_mut() = state.headers;
        response
    }
}
