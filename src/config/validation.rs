//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (hop cap > 0, addresses parse)
//! - Detect settings that cannot work together
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("router.max_redirect_hops must be greater than zero")]
    ZeroRedirectHops,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("admin.api_key must not be empty when set")]
    EmptyApiKey,

    #[error("catalog.watch requires catalog.path")]
    WatchWithoutPath,

    #[error("router.default_roles contains an empty role")]
    EmptyRole,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.router.max_redirect_hops == 0 {
        errors.push(ValidationError::ZeroRedirectHops);
    }
    if config.router.default_roles.iter().any(|r| r.trim().is_empty()) {
        errors.push(ValidationError::EmptyRole);
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "admin.bind_address",
            value: config.admin.bind_address.clone(),
        });
    }
    if config.admin.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        errors.push(ValidationError::EmptyApiKey);
    }

    if config.catalog.watch && config.catalog.path.is_none() {
        errors.push(ValidationError::WatchWithoutPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
