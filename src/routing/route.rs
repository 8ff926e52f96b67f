//! Route definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A declarative rule mapping an HTTP method and URL pattern to an
/// external entrypoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Unique identifier, assigned by whoever appends the route.
    #[serde(default)]
    pub id: String,

    /// HTTP verb (e.g. "GET").
    pub method: String,

    /// URL template, may contain `{name}` or `{name:regex}` variables.
    #[serde(rename = "url_pattern")]
    pub pattern: String,

    /// Program (plus leading arguments) that runs the route's command.
    #[serde(default)]
    pub entrypoint: String,

    /// Script handed to the entrypoint as its last argument.
    #[serde(default)]
    pub command: String,

    /// Capture stdout/stderr of the spawned process into the debug sink.
    #[serde(default)]
    pub debug: bool,

    /// Position in the table at read time. Not an identity.
    #[serde(default)]
    pub index: usize,
}

/// Errors raised by the routing subsystem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// No stored route carries the requested id.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// Another stored route already carries this id.
    #[error("duplicate route id: {0}")]
    DuplicateRouteId(String),

    /// The route's method is not a valid HTTP method.
    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    /// The route's URL pattern cannot be compiled.
    #[error("invalid url pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let route = Route {
            id: "r1".into(),
            method: "GET".into(),
            pattern: "/hello".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["url_pattern"], "/hello");
        assert_eq!(json["debug"], false);

        let parsed: Route =
            serde_json::from_str(r#"{"method":"POST","url_pattern":"/x"}"#).unwrap();
        assert_eq!(parsed.method, "POST");
        assert!(parsed.id.is_empty());
        assert_eq!(parsed.index, 0);
    }

    #[test]
    fn test_error_display() {
        let err = RoutingError::RouteNotFound("r9".into());
        assert_eq!(err.to_string(), "route not found: r9");
    }
}
