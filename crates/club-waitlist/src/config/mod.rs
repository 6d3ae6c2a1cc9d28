use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::waitlist::{ValidationMode, DEFAULT_NAMESPACE};

const DEFAULT_FILE_PATH: &str = "data/waitlist.json";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub waitlist: WaitlistConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            waitlist: WaitlistConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where accepted submissions are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    File { path: PathBuf },
    Redis { url: String },
    Memory,
}

/// Waitlist pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistConfig {
    pub backend: StorageBackend,
    pub namespace: String,
    pub validation: ValidationMode,
}

impl WaitlistConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var("WAITLIST_STORE")
            .unwrap_or_else(|_| "file".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "file" => StorageBackend::File {
                path: env::var("WAITLIST_FILE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_FILE_PATH)),
            },
            "redis" => StorageBackend::Redis {
                url: env::var("WAITLIST_REDIS_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::MissingRedisUrl)?,
            },
            "memory" => StorageBackend::Memory,
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let namespace = env::var("WAITLIST_NAMESPACE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let validation = match env::var("WAITLIST_VALIDATION") {
            Ok(raw) => ValidationMode::parse(&raw).ok_or(ConfigError::InvalidValidation(raw))?,
            Err(_) => ValidationMode::Permissive,
        };

        Ok(Self {
            backend,
            namespace,
            validation,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownBackend(String),
    MissingRedisUrl,
    InvalidValidation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownBackend(value) => write!(
                f,
                "WAITLIST_STORE must be one of file, redis, memory (got '{value}')"
            ),
            ConfigError::MissingRedisUrl => {
                write!(f, "WAITLIST_REDIS_URL is required when WAITLIST_STORE=redis")
            }
            ConfigError::InvalidValidation(value) => write!(
                f,
                "WAITLIST_VALIDATION must be permissive or strict (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownBackend(_)
            | ConfigError::MissingRedisUrl
            | ConfigError::InvalidValidation(_) => None,
        }
    }
}
