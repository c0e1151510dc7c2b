use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::prediction::{ArtifactPaths, CategoricalField, FallbackPolicy};

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

/// Top-level configuration for the prediction service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub prediction: PredictionConfig,
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

        let model_dir = env::var("APP_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models"));
        let fallbacks = match env::var("APP_CATEGORY_FALLBACKS") {
            Ok(raw) => parse_fallbacks(&raw)?,
            Err(_) => FallbackPolicy::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            prediction: PredictionConfig {
                model_dir,
                fallbacks,
            },
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

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Artifact location and unseen-label handling.
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    pub model_dir: PathBuf,
    pub fallbacks: FallbackPolicy,
}

impl PredictionConfig {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(self.model_dir.clone())
    }
}

/// Parse `field=Label` pairs separated by commas. An empty value disables every fallback.
fn parse_fallbacks(raw: &str) -> Result<FallbackPolicy, ConfigError> {
    let mut policy = FallbackPolicy::strict();

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (key, label) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidFallback(entry.to_string()))?;
        let label = label.trim();

        let field = CategoricalField::from_key(key)
            .filter(|field| *field != CategoricalField::Admission)
            .ok_or_else(|| ConfigError::InvalidFallback(entry.to_string()))?;
        if label.is_empty() {
            return Err(ConfigError::InvalidFallback(entry.to_string()));
        }

        policy = policy.with_fallback(field, label);
    }

    Ok(policy)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFallback(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFallback(entry) => write!(
                f,
                "APP_CATEGORY_FALLBACKS entry '{entry}' must look like <input field>=<label>"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidFallback(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
