//! Service configuration, layered with figment
//!
//! Sources, highest precedence first:
//! 1. `DATABASE_PATH`: selects the SQLite file (`:memory:` for an in-memory store)
//! 2. Environment variables (prefix: `PETSTORE_`, nested keys split on `__`)
//! 3. Current working directory: ./config.toml
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Environment variable overriding the database file path
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Path value selecting an in-memory store
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Storage configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Listener and logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level or `EnvFilter` directive (e.g. `info,sqlx=warn`)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of pooled connections (file-backed stores only)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

impl DatabaseConfig {
    /// In-memory store, used by tests
    pub fn in_memory() -> Self {
        Self {
            path: IN_MEMORY_PATH.to_string(),
            ..Self::default()
        }
    }

    /// Whether this configuration selects an in-memory store
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }

    /// Pool acquire timeout
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
            connection_timeout_secs: default_connection_timeout(),
        }
    }
}

/// HTTP middleware settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS mode: permissive, restrictive
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_database_path() -> String {
    "petstore.db".to_string()
}

fn default_max_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

impl Config {
    /// Load `./config.toml` and the environment over the defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Same as [`Config::load`] with an explicit file
    ///
    /// A missing file is not an error; defaults and the environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        } else {
            tracing::debug!("No configuration file at {}", path.display());
        }

        let config = Self::figment(path).extract()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PETSTORE_").split("__"))
            // The storage path override wins over everything else
            .merge(
                Env::raw()
                    .only(&[DATABASE_PATH_ENV])
                    .map(|_| "database.path".into()),
            )
    }

    /// Configuration for tests: defaults over an in-memory store
    pub fn for_tests() -> Self {
        Self {
            database: DatabaseConfig::in_memory(),
            ..Self::default()
        }
    }

    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "petstore-service".to_string(),
                host: default_host(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
            },
            database: DatabaseConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.database.path, "petstore.db");
        assert_eq!(config.database.max_connections, 1);
        assert!(!config.database.is_in_memory());
    }

    #[test]
    fn test_in_memory_config() {
        let config = Config::for_tests();
        assert!(config.database.is_in_memory());
        assert_eq!(config.database.path, ":memory:");
    }

    #[test]
    fn test_database_path_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[database]\npath = \"from-file.db\"\n")?;
            let config = Config::load_from("config.toml").expect("config loads");
            assert_eq!(config.database.path, "from-file.db");

            jail.set_env("DATABASE_PATH", ":memory:");
            let config = Config::load_from("config.toml").expect("config loads");
            assert!(config.database.is_in_memory());
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_nesting() {
        Jail::expect_with(|jail| {
            jail.set_env("PETSTORE_SERVICE__PORT", "9999");
            jail.set_env("PETSTORE_MIDDLEWARE__CORS_MODE", "restrictive");
            let config = Config::load_from("missing.toml").expect("config loads");
            assert_eq!(config.service.port, 9999);
            assert_eq!(config.middleware.cors_mode, "restrictive");
            assert_eq!(config.database.path, "petstore.db");
            Ok(())
        });
    }
}
