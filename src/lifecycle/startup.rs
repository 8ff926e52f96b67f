//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Load the routes declared in configuration
//! - Bind the user, control and admin listeners and serve them
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners bind before any of them serves, so a port conflict aborts
//!   startup cleanly
//! - Listeners start last (traffic only when routes are published)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::admin::{self, AdminState, RouteService};
use crate::config::ServerConfig;
use crate::control::{self, ControlState};
use crate::dispatch::Dispatcher;
use crate::handlers::HandlerRegistry;
use crate::http::{self, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::RoutingError;
use crate::spawn::{ProcessSpawner, Spawner};

/// Fatal startup or serving errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {name} listener on {address}: {source}")]
    Bind {
        name: &'static str,
        address: String,
        source: std::io::Error,
    },

    #[error("route {id:?} from configuration rejected: {source}")]
    Route { id: String, source: RoutingError },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// The wired-up application: routing core, registry and the three routers.
pub struct App {
    pub config: ServerConfig,
    pub registry: HandlerRegistry,
    pub routes: Arc<RouteService>,
}

impl App {
    /// Wire the application with the process spawner from `config`.
    pub fn new(config: ServerConfig) -> Result<Self, StartupError> {
        let spawner = ProcessSpawner::new(config.control.url())
            .with_default_entrypoint(config.spawn.default_entrypoint.clone());
        Self::with_spawner(config, Arc::new(spawner))
    }

    /// Wire the application around any spawner.
    pub fn with_spawner(
        config: ServerConfig,
        spawner: Arc<dyn Spawner>,
    ) -> Result<Self, StartupError> {
        let registry = HandlerRegistry::new();
        let dispatcher = Dispatcher::new(registry.clone(), spawner);
        let routes = Arc::new(RouteService::new(dispatcher));

        for route in config.routes.iter().cloned() {
            let route = route.into_route(|| Uuid::new_v4().to_string());
            let id = route.id.clone();
            routes
                .append(route)
                .map_err(|source| StartupError::Route { id, source })?;
        }

        tracing::info!(routes = routes.list().len(), "Routes loaded");

        Ok(Self {
            config,
            registry,
            routes,
        })
    }

    pub fn user_router(&self) -> axum::Router {
        HttpServer::new(self.routes.multiplexer(), self.config.limits.max_body_size).into_router()
    }

    pub fn control_router(&self) -> axum::Router {
        control::setup_control_router(ControlState {
            registry: self.registry.clone(),
            max_body_size: self.config.limits.max_body_size,
        })
    }

    pub fn admin_router(&self) -> axum::Router {
        admin::setup_admin_router(AdminState {
            routes: self.routes.clone(),
            handlers: self.registry.clone(),
            api_key: self.config.admin.api_key.clone(),
        })
    }

    /// Bind all listeners, serve until `shutdown` fires.
    pub async fn run(self, shutdown: &Shutdown) -> Result<(), StartupError> {
        let stop = (shutdown.subscribe(), shutdown.subscribe(), shutdown.subscribe());
        if shutdown.is_triggered() {
            return Ok(());
        }

        let user = bind("user", &self.config.user.bind_address).await?;
        let control = bind("control", &self.config.control.bind_address).await?;
        let admin = bind("admin", &self.config.admin.bind_address).await?;

        tracing::info!(control_url = %self.config.control.url(), "Control API advertised to processes");

        let (user, control, admin) = tokio::join!(
            http::serve("user", user, self.user_router(), stop.0),
            http::serve("control", control, self.control_router(), stop.1),
            http::serve("admin", admin, self.admin_router(), stop.2),
        );
        user?;
        control?;
        admin?;
        Ok(())
    }
}

async fn bind(name: &'static str, address: &str) -> Result<TcpListener, StartupError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            name,
            address: address.to_string(),
            source,
        })?;
    let local: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(listener = name, address = ?local, "Listening for connections");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::dispatch::OutputSink;
    use crate::handlers::Handler;
    use crate::spawn::SpawnError;

    fn noop() -> Arc<dyn Spawner> {
        Arc::new(|_h: Arc<Handler>, _o: OutputSink, _e: OutputSink| async {
            Ok::<(), SpawnError>(())
        })
    }

    fn route(id: Option<&str>, pattern: &str) -> RouteConfig {
        RouteConfig {
            id: id.map(String::from),
            method: "GET".into(),
            url_pattern: pattern.into(),
            entrypoint: String::new(),
            command: "true".into(),
            debug: false,
        }
    }

    #[test]
    fn test_config_routes_are_published_in_order() {
        let mut config = ServerConfig::default();
        config.routes = vec![route(Some("first"), "/a"), route(None, "/b")];

        let app = App::with_spawner(config, noop()).unwrap();
        let routes = app.routes.list();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].id, "first");
        assert_eq!(routes[0].index, 0);
        assert_eq!(routes[1].index, 1);
        assert!(Uuid::parse_str(&routes[1].id).is_ok());
        assert_eq!(app.routes.multiplexer().load().len(), 2);
    }

    #[test]
    fn test_bad_config_route_is_fatal() {
        let mut config = ServerConfig::default();
        config.routes = vec![route(Some("broken"), "no-slash")];

        let err = App::with_spawner(config, noop()).err().unwrap();
        assert!(matches!(err, StartupError::Route { ref id, .. } if id == "broken"));
    }

    #[tokio::test]
    async fn test_run_returns_after_shutdown() {
        let mut config = ServerConfig::default();
        config.user.bind_address = "127.0.0.1:0".into();
        config.control.bind_address = "127.0.0.1:0".into();
        config.admin.bind_address = "127.0.0.1:0".into();
        let app = App::with_spawner(config, noop()).unwrap();

        let shutdown = Arc::new(Shutdown::new());
        let running = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { app.run(&shutdown).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown.trigger();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), running)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = taken.local_addr().unwrap().to_string();
        let err = bind("user", &address).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { name: "user", .. }));
    }
}
