//! `WardenConfig`: the CLI's configuration file.
//!
//! ```toml
//! [routes]
//! login = "/login"
//! unauthorized = "/unauthorized"
//!
//! [realtime]
//! endpoint = "/hubs/notifications"
//! min_delay_ms = 500
//! max_delay_ms = 30000
//!
//! [registry.roles]
//! Guest = ["view_cars"]
//! ```
//!
//! Every section is optional. Without `[registry]` the built-in role table
//! is used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warden_acl::{AccessGuard, Destinations, Resolver};
use warden_core::{Registry, RegistryConfig};
use warden_realtime::RealtimeConfig;

use crate::error::{Error, Result};

/// Redirect destinations for denied navigations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Where unauthenticated users are sent.
    pub login: String,
    /// Where authenticated but denied users are sent.
    pub unauthorized: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        let d = Destinations::default();
        Self {
            login: d.login,
            unauthorized: d.unauthorized,
        }
    }
}

impl From<&RoutesConfig> for Destinations {
    fn from(routes: &RoutesConfig) -> Self {
        Destinations {
            login: routes.login.clone(),
            unauthorized: routes.unauthorized.clone(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Role table override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,
    /// Redirect destinations.
    pub routes: RoutesConfig,
    /// Notification connection settings.
    pub realtime: RealtimeConfig,
}

impl WardenConfig {
    /// The project name used for the config directory.
    pub fn project_name() -> &'static str {
        "warden"
    }

    /// `<config_dir>/warden/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(Self::project_name()).join("config.toml"))
    }

    /// An explicit path wins; otherwise the platform default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        match explicit {
            Some(p) => Some(PathBuf::from(p)),
            None => Self::default_config_path(),
        }
    }

    /// Load from `explicit` or the default location.
    ///
    /// A missing default file yields defaults. A missing explicit file is an
    /// error.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit) else {
            log::debug!("No config directory on this platform; using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            if explicit.is_some() {
                return Err(Error::config(format!(
                    "Config file does not exist at {}",
                    path.display()
                )));
            }
            log::debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::config(e.to_string()))
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured registry, or the built-in table.
    pub fn registry(&self) -> Result<Registry> {
        match &self.registry {
            Some(table) => Ok(Registry::from_config(table)?),
            None => Ok(Registry::builtin()),
        }
    }

    /// A guard over [`registry`](Self::registry) with the configured routes.
    pub fn guard(&self) -> Result<AccessGuard> {
        let resolver = Resolver::new(Arc::new(self.registry()?));
        Ok(AccessGuard::new(resolver).with_destinations((&self.routes).into()))
    }
}
