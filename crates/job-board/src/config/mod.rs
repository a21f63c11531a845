use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::board::router::{DashboardWindow, MAX_DASHBOARD_MONTHS, MAX_DASHBOARD_WEEKS};

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
    pub board: BoardConfig,
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

        let dashboard_months = read_count("APP_DASHBOARD_MONTHS", 6, MAX_DASHBOARD_MONTHS)?;
        let dashboard_weeks = read_count("APP_DASHBOARD_WEEKS", 4, MAX_DASHBOARD_WEEKS)?;
        let seed_csv = env::var("APP_SEED_CSV")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            board: BoardConfig {
                dashboard_months,
                dashboard_weeks,
                seed_csv,
            },
        })
    }
}

fn read_count(var: &'static str, default: usize, max: usize) -> Result<usize, ConfigError> {
    let count = match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidCount { var })?,
        Err(_) => default,
    };

    if count > max {
        return Err(ConfigError::CountTooLarge { var, max });
    }
    Ok(count)
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Job board defaults: dashboard chart windows and the optional catalog seed export.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub dashboard_months: usize,
    pub dashboard_weeks: usize,
    pub seed_csv: Option<PathBuf>,
}

impl BoardConfig {
    pub fn dashboard_window(&self) -> DashboardWindow {
        DashboardWindow {
            months: self.dashboard_months,
            weeks: self.dashboard_weeks,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCount { var: &'static str },
    CountTooLarge { var: &'static str, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCount { var } => {
                write!(f, "{var} must be a non-negative whole number")
            }
            ConfigError::CountTooLarge { var, max } => write!(f, "{var} must be at most {max}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidCount { .. }
            | ConfigError::CountTooLarge { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
