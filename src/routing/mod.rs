//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Admin mutation (append / delete)
//!     → table.rs (RouteTable, ordered, lock-guarded)
//!     → snapshot()
//!     → router.rs build(snapshot, handler_factory)
//!     → matcher.rs (compile patterns, parse methods)
//!     → immutable Multiplexer, published by the admin layer
//!
//! Incoming Request (method, path)
//!     → Multiplexer::dispatch (first match wins)
//!     → route's RequestHandler, or 404 / 405
//! ```
//!
//! # Design Decisions
//! - Multiplexers are never mutated; every change builds a new one
//! - In-flight requests keep the multiplexer they started with
//! - `Route::index` is a view ordinal; `Route::id` is the identity

pub mod matcher;
pub mod route;
pub mod router;
pub mod table;

pub use matcher::{PathParams, PathPattern};
pub use route::{Route, RoutingError};
pub use router::{build, validate_route, Multiplexer, RequestHandler, Resolution};
pub use table::RouteTable;
