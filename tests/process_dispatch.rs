//! Dispatching to real child processes.
#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request};
use procmux::dispatch::{BufferSink, Dispatcher};
use procmux::handlers::{HandlerRegistry, IdError};
use procmux::routing::Route;
use procmux::spawn::ProcessSpawner;

fn dispatcher(sink: &BufferSink, registry: &HandlerRegistry) -> Dispatcher {
    let fixed = || -> Result<String, IdError> { Ok("fixed-id".to_string()) };
    Dispatcher::new(
        registry.clone(),
        Arc::new(ProcessSpawner::new("http://127.0.0.1:1")),
    )
    .with_id_generator(Arc::new(fixed))
    .with_debug_sink(Arc::new(sink.clone()))
}

fn route(command: &str, debug: bool) -> Route {
    Route {
        id: "r".into(),
        method: "GET".into(),
        pattern: "/run".into(),
        command: command.into(),
        debug,
        ..Default::default()
    }
}

fn request() -> Request<Body> {
    Request::builder().uri("/run").body(Body::empty()).unwrap()
}

/// Debug capture is eventual; poll until `needle` shows up.
async fn wait_for(sink: &BufferSink, needle: &str) -> bool {
    for _ in 0..100 {
        if sink.contents_lossy().contains(needle) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_debug_route_captures_both_streams() {
    let sink = BufferSink::new();
    let registry = HandlerRegistry::new();
    let d = dispatcher(&sink, &registry);

    let resp = d
        .serve(
            route("echo out:$PROCMUX_HANDLER_ID; echo err:$PROCMUX_ROUTE_ID >&2", true),
            request(),
        )
        .await;
    assert_eq!(resp.status(), 200);
    assert!(registry.is_empty());

    assert!(wait_for(&sink, "out:fixed-id").await);
    assert!(wait_for(&sink, "err:r").await);
}

#[tokio::test]
async fn test_quiet_route_records_nothing() {
    let sink = BufferSink::new();
    let registry = HandlerRegistry::new();
    let d = dispatcher(&sink, &registry);

    let resp = d.serve(route("echo should-not-appear", false), request()).await;
    assert_eq!(resp.status(), 200);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_failing_process_still_answers_and_deregisters() {
    let sink = BufferSink::new();
    let registry = HandlerRegistry::new();
    let d = dispatcher(&sink, &registry);

    let resp = d.serve(route("exit 7", false), request()).await;
    assert_eq!(resp.status(), 200);
    assert!(registry.is_empty());
}
