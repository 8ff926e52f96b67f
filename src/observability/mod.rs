//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, registry, route service
//!     → logging.rs  (handler_id / route_id tagged events, captured
//!                    process output on target procmux::debug)
//!     → metrics.rs  (request outcomes, spawn durations, live handlers)
//! ```

pub mod logging;
pub mod metrics;
