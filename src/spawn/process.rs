//! Spawner that runs route entrypoints as child processes.
//!
//! # Responsibilities
//! - Build the command line from the route's entrypoint and command
//! - Export the handler id and control API URL to the child
//! - Copy child stdout/stderr into the provided sinks until exit
//!
//! # Design Decisions
//! - Entrypoint is split on whitespace (no shell quoting); use a shell
//!   entrypoint such as `/bin/sh -c` for anything richer
//! - The child is not killed when the request goes away

use std::process::Stdio;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::io::AsyncRead;
use tokio::process::Command;

use crate::dispatch::output::OutputSink;
use crate::handlers::Handler;
use crate::spawn::{SpawnError, Spawner};

/// Environment variable carrying the handler id.
pub const HANDLER_ID_ENV: &str = "PROCMUX_HANDLER_ID";
/// Environment variable carrying the control API base URL.
pub const CONTROL_URL_ENV: &str = "PROCMUX_CONTROL_URL";
/// Environment variable carrying the matched route id.
pub const ROUTE_ID_ENV: &str = "PROCMUX_ROUTE_ID";

/// Runs each handler's route as a local child process.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    control_url: String,
    default_entrypoint: String,
}

impl ProcessSpawner {
    /// Create a spawner that points children at the given control API URL.
    pub fn new(control_url: impl Into<String>) -> Self {
        Self {
            control_url: control_url.into(),
            default_entrypoint: "/bin/sh -c".to_string(),
        }
    }

    /// Entrypoint used for routes that do not set one.
    pub fn with_default_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.default_entrypoint = entrypoint.into();
        self
    }

    fn command_for(&self, handler: &Handler) -> Result<Command, SpawnError> {
        let entrypoint = if handler.route.entrypoint.trim().is_empty() {
            &self.default_entrypoint
        } else {
            &handler.route.entrypoint
        };

        let mut parts = entrypoint.split_whitespace();
        let program = parts.next().ok_or(SpawnError::EmptyEntrypoint)?;

        let mut cmd = Command::new(program);
        cmd.args(parts);
        if !handler.route.command.is_empty() {
            cmd.arg(&handler.route.command);
        }
        cmd.env(HANDLER_ID_ENV, &handler.id)
            .env(CONTROL_URL_ENV, &self.control_url)
            .env(ROUTE_ID_ENV, &handler.route.id)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(cmd)
    }

    async fn run(
        &self,
        handler: Arc<Handler>,
        mut stdout: OutputSink,
        mut stderr: OutputSink,
    ) -> Result<(), SpawnError> {
        let mut child = self.command_for(&handler)?.spawn()?;
        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();

        tracing::debug!(
            handler_id = %handler.id,
            pid = ?child.id(),
            "Process started"
        );

        let (status, out, err) = tokio::join!(
            child.wait(),
            pump(child_stdout, &mut stdout),
            pump(child_stderr, &mut stderr),
        );

        for (stream, result) in [("stdout", out), ("stderr", err)] {
            if let Err(e) = result {
                tracing::warn!(handler_id = %handler.id, stream, error = %e, "Output copy failed");
            }
        }

        let status = status?;
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(SpawnError::Exit(code)),
            None => Err(SpawnError::Killed),
        }
    }
}

async fn pump<R>(source: Option<R>, sink: &mut OutputSink) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    match source {
        Some(mut source) => tokio::io::copy(&mut source, sink).await,
        None => Ok(0),
    }
}

impl Spawner for ProcessSpawner {
    fn spawn(
        &self,
        handler: Arc<Handler>,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> BoxFuture<'_, Result<(), SpawnError>> {
        Box::pin(self.run(handler, stdout, stderr))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::dispatch::output::BufferSink;
    use crate::handlers::ResponseWriter;
    use crate::routing::Route;
    use axum::{body::Body, http::Request};
    use std::time::Duration;

    fn handler(command: &str) -> Arc<Handler> {
        let route = Route {
            id: "r1".into(),
            method: "GET".into(),
            pattern: "/".into(),
            command: command.into(),
            ..Default::default()
        };
        Arc::new(Handler::new(
            "h-123".into(),
            route,
            Request::new(Body::empty()),
            ResponseWriter::new(),
        ))
    }

    async fn settle(sink: &BufferSink, needle: &str) -> String {
        for _ in 0..100 {
            let got = sink.contents_lossy();
            if got.contains(needle) {
                return got;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        sink.contents_lossy()
    }

    #[tokio::test]
    async fn test_runs_command_with_env() {
        let spawner = ProcessSpawner::new("http://127.0.0.1:1");
        let buffer = BufferSink::new();
        let out = OutputSink::forward_to(Arc::new(buffer.clone()));
        let err = OutputSink::forward_to(Arc::new(buffer.clone()));

        let script = format!("echo id=${HANDLER_ID_ENV} url=${CONTROL_URL_ENV}; echo oops >&2");
        spawner.spawn(handler(&script), out, err).await.unwrap();

        let got = settle(&buffer, "oops").await;
        assert!(got.contains("id=h-123"), "got {got:?}");
        assert!(got.contains("url=http://127.0.0.1:1"), "got {got:?}");
        assert!(got.contains("oops"), "got {got:?}");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_an_error() {
        let spawner = ProcessSpawner::new("http://127.0.0.1:1");
        let result = spawner
            .spawn(handler("exit 3"), OutputSink::discard(), OutputSink::discard())
            .await;
        assert!(matches!(result, Err(SpawnError::Exit(3))));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let spawner = ProcessSpawner::new("http://127.0.0.1:1")
            .with_default_entrypoint("/definitely/not/here");
        let result = spawner
            .spawn(handler(""), OutputSink::discard(), OutputSink::discard())
            .await;
        assert!(matches!(result, Err(SpawnError::Io(_))));

        let spawner = ProcessSpawner::new("http://127.0.0.1:1").with_default_entrypoint("   ");
        let result = spawner
            .spawn(handler(""), OutputSink::discard(), OutputSink::discard())
            .await;
        assert!(matches!(result, Err(SpawnError::EmptyEntrypoint)));
    }
}
