//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config file.
//! Every section has defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::{StaticOptions, Widget};
use crate::routing::matcher::{MatcherOptions, DEFAULT_MAX_REDIRECT_HOPS};
use crate::tree::{Role, RoleSet};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Matching behavior and initial viewer roles.
    pub router: RouterConfig,

    /// Where permission-scoped routes come from.
    pub catalog: CatalogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Router configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Redirects followed by one resolution before falling back.
    pub max_redirect_hops: usize,

    /// Compare literal path segments case-sensitively.
    pub case_sensitive: bool,

    /// Roles the session starts with.
    pub default_roles: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
            case_sensitive: false,
            default_roles: Vec::new(),
        }
    }
}

impl RouterConfig {
    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            max_redirect_hops: self.max_redirect_hops,
            case_sensitive: self.case_sensitive,
        }
    }

    pub fn default_role_set(&self) -> RoleSet {
        self.default_roles.iter().map(|r| Role::new(r.as_str())).collect()
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file replacing the compiled-in superset catalog.
    pub path: Option<PathBuf>,

    /// Dashboard widget pages to include in the static routes.
    pub widgets: Vec<Widget>,

    /// Reload the catalog file when it changes.
    pub watch: bool,
}

impl CatalogConfig {
    pub fn static_options(&self) -> StaticOptions {
        StaticOptions::with_widgets(self.widgets.iter().copied())
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

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,

    /// Bearer token required by every admin request. Unset disables auth.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: None,
        }
    }
}
