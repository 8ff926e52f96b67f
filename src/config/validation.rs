//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that bind addresses parse
//! - Check that declared routes compile and ids are unique
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::matcher::{parse_method, PathPattern};
use crate::routing::RoutingError;

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    BadAddress { field: &'static str, value: String },

    #[error("routes[{index}]: {source}")]
    BadRoute { index: usize, source: RoutingError },

    #[error("routes[{index}]: duplicate route id {id:?}")]
    DuplicateRouteId { index: usize, id: String },

    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let addresses = [
        ("user.bind_address", &config.user.bind_address),
        ("control.bind_address", &config.control.bind_address),
        ("admin.bind_address", &config.admin.bind_address),
    ];
    for (field, value) in addresses {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::BadAddress {
                field,
                value: value.clone(),
            });
        }
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut ids = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if let Err(source) = parse_method(&route.method) {
            errors.push(ValidationError::BadRoute { index, source });
        }
        if let Err(source) = PathPattern::parse(&route.url_pattern) {
            errors.push(ValidationError::BadRoute { index, source });
        }
        if let Some(id) = &route.id {
            if !ids.insert(id.clone()) {
                errors.push(ValidationError::DuplicateRouteId {
                    index,
                    id: id.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
