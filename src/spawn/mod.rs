//! Process spawning subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle manager (handler registered)
//!     → Spawner::spawn(handler, stdout, stderr)
//!     → process.rs runs the route's entrypoint with the handler id in its env
//!     → the process reads the request / writes the response via the control API
//!     → process exits → spawn returns
//! ```
//!
//! # Design Decisions
//! - The spawn future resolves only when the process has exited
//! - Spawners never touch the registry; registration is the caller's job

pub mod process;

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::dispatch::output::OutputSink;
use crate::handlers::Handler;

pub use process::ProcessSpawner;

/// Errors returned by a spawner.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Neither the route nor the spawner provides an entrypoint.
    #[error("no entrypoint configured")]
    EmptyEntrypoint,

    /// The process could not be started or waited on.
    #[error("failed to run entrypoint: {0}")]
    Io(#[from] std::io::Error),

    /// The process exited with a non-zero status.
    #[error("process exited with status {0}")]
    Exit(i32),

    /// The process was terminated by a signal.
    #[error("process terminated by signal")]
    Killed,

    /// Failure reported by a custom spawner.
    #[error("{0}")]
    Other(String),
}

/// Runs a route's entrypoint for one handler.
pub trait Spawner: Send + Sync {
    /// Run the process to completion, wiring its output into the sinks.
    fn spawn(
        &self,
        handler: Arc<Handler>,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> BoxFuture<'_, Result<(), SpawnError>>;
}

impl<F, Fut> Spawner for F
where
    F: Fn(Arc<Handler>, OutputSink, OutputSink) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SpawnError>> + Send + 'static,
{
    fn spawn(
        &self,
        handler: Arc<Handler>,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> BoxFuture<'_, Result<(), SpawnError>> {
        Box::pin(self(handler, stdout, stderr))
    }
}
