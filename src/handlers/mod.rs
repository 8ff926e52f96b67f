//! In-flight handler subsystem.
//!
//! # Data Flow
//! ```text
//! Matched request
//!     → identity.rs (generate handler id)
//!     → handler.rs (Handler: route + request + response writer)
//!     → registry.rs (reachable by id while the process runs)
//!     → control API reads request / writes response by id
//! ```

pub mod handler;
pub mod identity;
pub mod registry;

pub use handler::{Handler, HandlerRequest, ResponseWriter};
pub use identity::{IdError, IdGenerator, UuidGenerator};
pub use registry::HandlerRegistry;
