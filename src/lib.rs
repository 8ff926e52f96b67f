//! procmux: an HTTP front end that answers each request by spawning a process.
//!
//! Every matched request gets a handler with a fresh id, registered for the
//! lifetime of the process so it can read the request and write the response
//! through the control API.

pub mod admin;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod spawn;

pub use config::schema::ServerConfig;
pub use dispatch::Dispatcher;
pub use handlers::{Handler, HandlerRegistry};
pub use http::HttpServer;
pub use lifecycle::{App, Shutdown};
pub use routing::{Route, RouteTable};
