//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::Route;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// User-facing server that dispatches to routes.
    pub user: ListenerConfig,

    /// Script-facing control API.
    pub control: ControlConfig,

    /// Route administration API.
    pub admin: AdminConfig,

    /// Process spawning settings.
    pub spawn: SpawnConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Routes loaded at startup, in order.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Control API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Bind address for the control API.
    pub bind_address: String,

    /// Base URL handed to spawned processes. Derived from `bind_address`
    /// when unset.
    pub public_url: Option<String>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8082".to_string(),
            public_url: None,
        }
    }
}

impl ControlConfig {
    /// URL spawned processes use to reach the control API.
    pub fn url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind_address),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin API bind address.
    pub bind_address: String,

    /// Bearer token required on admin requests. No auth when unset.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: None,
        }
    }
}

/// Process spawning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Entrypoint for routes that do not set one.
    pub default_entrypoint: String,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            default_entrypoint: "/bin/sh -c".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A route declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier. Generated at load time when omitted.
    #[serde(default)]
    pub id: Option<String>,

    /// HTTP method.
    pub method: String,

    /// URL pattern.
    pub url_pattern: String,

    /// Entrypoint override.
    #[serde(default)]
    pub entrypoint: String,

    /// Command passed to the entrypoint.
    #[serde(default)]
    pub command: String,

    /// Capture process output into the debug log.
    #[serde(default)]
    pub debug: bool,
}

impl RouteConfig {
    /// Convert into a route, using `fallback_id` when no id is set.
    pub fn into_route(self, fallback_id: impl FnOnce() -> String) -> Route {
        Route {
            id: self.id.unwrap_or_else(fallback_id),
            method: self.method,
            pattern: self.url_pattern,
            entrypoint: self.entrypoint,
            command: self.command,
            debug: self.debug,
            index: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.user.bind_address, "0.0.0.0:8080");
        assert_eq!(config.control.url(), "http://127.0.0.1:8082");
        assert!(config.admin.api_key.is_none());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config: ServerConfig = toml::from_str(
            r#"
            [user]
            bind_address = "127.0.0.1:9000"

            [control]
            public_url = "http://control.local:8082/"

            [admin]
            api_key = "secret"

            [[routes]]
            id = "hello"
            method = "GET"
            url_pattern = "/hello/{name}"
            command = "echo hi"
            debug = true

            [[routes]]
            method = "POST"
            url_pattern = "/upload"
            "#,
        )
        .unwrap();

        assert_eq!(config.user.bind_address, "127.0.0.1:9000");
        assert_eq!(config.control.url(), "http://control.local:8082");
        assert_eq!(config.admin.api_key.as_deref(), Some("secret"));
        assert_eq!(config.routes.len(), 2);

        let route = config.routes[0].clone().into_route(|| "unused".into());
        assert_eq!(route.id, "hello");
        assert_eq!(route.pattern, "/hello/{name}");
        assert!(route.debug);

        let route = config.routes[1].clone().into_route(|| "generated".into());
        assert_eq!(route.id, "generated");
        assert!(route.command.is_empty());
    }
}
