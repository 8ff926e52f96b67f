//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum, tracing, body limit)
//!     → ArcSwap<Multiplexer>::load_full
//!     → Multiplexer::dispatch → route handler / 404 / 405
//!     → Send to client
//! ```

pub mod server;

pub use server::{serve, AppState, HttpServer};
