//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use procmux::dispatch::OutputSink;
use procmux::handlers::Handler;
use procmux::spawn::{SpawnError, Spawner};
use tokio::net::TcpListener;

/// Bind an ephemeral port on localhost.
#[allow(dead_code)]
pub async fn bind_local() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Serve `router` on `listener` in the background.
#[allow(dead_code)]
pub fn serve(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

/// A spawner that does nothing and succeeds.
#[allow(dead_code)]
pub fn noop_spawner() -> Arc<dyn Spawner> {
    Arc::new(|_h: Arc<Handler>, _o: OutputSink, _e: OutputSink| async {
        Ok::<(), SpawnError>(())
    })
}

/// A stand-in for a spawned script: talks to the control API over HTTP using
/// the handler id, exactly as a child process would.
#[allow(dead_code)]
#[derive(Clone)]
pub struct ControlClient {
    client: reqwest::Client,
    base: String,
}

#[allow(dead_code)]
impl ControlClient {
    pub fn new(control_addr: SocketAddr) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("http://{}", control_addr),
        }
    }

    fn url(&self, id: &str, path: &str) -> String {
        format!("{}/handlers/{}/{}", self.base, id, path)
    }

    /// GET a request attribute; `None` on a non-2xx answer.
    pub async fn get(&self, id: &str, path: &str) -> Option<String> {
        let res = self.client.get(self.url(id, path)).send().await.ok()?;
        if !res.status().is_success() {
            return None;
        }
        res.text().await.ok()
    }

    /// Raw status of a GET, for asserting on missing handlers.
    pub async fn get_status(&self, id: &str, path: &str) -> u16 {
        self.client
            .get(self.url(id, path))
            .send()
            .await
            .unwrap()
            .status()
            .as_u16()
    }

    pub async fn put(&self, id: &str, path: &str, body: impl Into<reqwest::Body>) -> u16 {
        self.client
            .put(self.url(id, path))
            .body(body)
            .send()
            .await
            .unwrap()
            .status()
            .as_u16()
    }
}
