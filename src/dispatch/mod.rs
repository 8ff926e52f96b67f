//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Multiplexer match
//!     → lifecycle.rs (id → register → spawn → deregister)
//!     → output.rs (stdout/stderr sinks, debug capture)
//!     → Spawner (process runs, writes response via control API)
//!     → ResponseWriter → client
//! ```

pub mod lifecycle;
pub mod output;

pub use lifecycle::Dispatcher;
pub use output::{BufferSink, DebugSink, OutputSink, TracingSink};
