//! Server configuration
//!
//! Defaults, optionally overlaid by a YAML file, then by `CASEGRAPH_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where the cache capability lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CacheBackend {
    Memory,
    /// `redis://host[:port]`
    Redis(String),
}

impl TryFrom<String> for CacheBackend {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("memory") {
            Ok(CacheBackend::Memory)
        } else if value.starts_with("redis://") {
            Ok(CacheBackend::Redis(value))
        } else {
            Err(format!("unknown cache backend {value:?}, expected `memory` or a redis:// url"))
        }
    }
}

impl From<CacheBackend> for String {
    fn from(backend: CacheBackend) -> Self {
        backend.to_string()
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::Memory => f.write_str("memory"),
            CacheBackend::Redis(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// When false the PageRank procedure is reported as missing
    pub analytics_enabled: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { analytics_enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store_timeout_ms: u64,
    pub cache: CacheConfig,
    pub graph: GraphConfig,
    pub seed_demo_data: bool,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            store_timeout_ms: 3000,
            cache: CacheConfig::default(),
            graph: GraphConfig::default(),
            seed_demo_data: true,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Defaults, then the YAML file at `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "loading config file");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Overlay `CASEGRAPH_*` variables as returned by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CASEGRAPH_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("CASEGRAPH_PORT") {
            self.port = parse("CASEGRAPH_PORT", port)?;
        }
        if let Some(ms) = lookup("CASEGRAPH_STORE_TIMEOUT_MS") {
            self.store_timeout_ms = parse("CASEGRAPH_STORE_TIMEOUT_MS", ms)?;
        }
        if let Some(backend) = lookup("CASEGRAPH_CACHE") {
            self.cache.backend = CacheBackend::try_from(backend.clone()).map_err(|_| ConfigError::InvalidValue {
                name: "CASEGRAPH_CACHE".to_string(),
                value: backend,
            })?;
        }
        if let Some(flag) = lookup("CASEGRAPH_ANALYTICS") {
            self.graph.analytics_enabled = parse_flag("CASEGRAPH_ANALYTICS", flag)?;
        }
        if let Some(flag) = lookup("CASEGRAPH_SEED") {
            self.seed_demo_data = parse_flag("CASEGRAPH_SEED", flag)?;
        }
        if let Some(origins) = lookup("CASEGRAPH_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Permissive when no origins are configured, otherwise restricted to the
    /// origins that parse
    pub fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if self.cors_origins.is_empty() {
            return layer.allow_origin(Any);
        }

        let origins: Vec<axum::http::HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "CORS: invalid origin, skipping");
                    None
                }
            })
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

fn parse<T: std::str::FromStr>(name: &str, value: String) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value,
    })
}

fn parse_flag(name: &str, value: String) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
    }
}
