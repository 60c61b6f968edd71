//! Server configuration.

use std::fmt;
use std::str::FromStr;

/// Where the ledger keeps its transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Process memory; lost on restart.
    Memory,
    /// PostgreSQL `transactions` table.
    Postgres,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageKind::Memory),
            "postgres" | "postgresql" => Ok(StorageKind::Postgres),
            other => Err(format!("Unknown storage kind: {}", other)),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::Postgres => f.write_str("postgres"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable, for local runs.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected strategy.
    pub kind: StorageKind,
    /// Database URL (postgres only).
    pub database_url: String,
    /// Connection pool size (postgres only).
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::Memory,
            database_url: String::new(),
            max_connections: 5,
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Log level, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Log format.
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            storage: StorageConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("LEDGER_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("LEDGER_LISTEN_PORT") {
            config.listen_port = port
                .parse()
                .map_err(|_| format!("Invalid LEDGER_LISTEN_PORT: {}", port))?;
        }

        if let Some(kind) = lookup("LEDGER_STORAGE") {
            config.storage.kind = kind.parse()?;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            config.storage.database_url = url;
        }

        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.storage.max_connections = max
                .parse()
                .map_err(|_| format!("Invalid DATABASE_MAX_CONNECTIONS: {}", max))?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = format.parse()?;
        }

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.storage.kind == StorageKind::Postgres {
            if self.storage.database_url.is_empty() {
                return Err("DATABASE_URL is required for postgres storage".to_string());
            }
            if self.storage.max_connections == 0 {
                return Err("Database pool needs at least one connection".to_string());
            }
        }

        Ok(())
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }
}
