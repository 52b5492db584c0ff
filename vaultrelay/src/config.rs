//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables and the
//! typed configuration structs built from them.

use std::path::PathBuf;
use std::time::Duration;

/// Get an environment variable, falling back to a default when unset.
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed to a specific type.
///
/// Returns the default when the variable is unset; logs a warning and
/// returns the default when the value does not parse.
pub fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    "Environment variable '{}' has unparsable value '{}', using default",
                    name,
                    raw
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Server configuration (bind address and upload bounds)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load server configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env_or("VAULTRELAY_HOST", "0.0.0.0");
        let port = env_parse("VAULTRELAY_PORT", 5000u16);
        Self::from_args(host, port)
    }

    /// Build server configuration from explicit host/port, reading the
    /// remaining settings from the environment.
    pub fn from_args(host: String, port: u16) -> Self {
        let max_upload_bytes = env_parse("VAULTRELAY_MAX_UPLOAD_BYTES", 100 * 1024 * 1024usize);
        Self {
            host,
            port,
            max_upload_bytes,
        }
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Object store configuration
///
/// When `endpoint` is unset the relay falls back to a local filesystem
/// store rooted at `local_dir`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Remote store endpoint URL (e.g. `https://nyc3.example.com`)
    pub endpoint: Option<String>,
    /// Bucket name under the endpoint
    pub bucket: String,
    /// Optional bearer token for the remote store
    pub token: Option<String>,
    /// Request timeout for store calls
    pub timeout: Duration,
    /// Root directory for the filesystem fallback store
    pub local_dir: PathBuf,
}

impl StoreConfig {
    /// Load store configuration from environment variables.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("VAULTRELAY_STORE_ENDPOINT")
            .ok()
            .filter(|v| !v.is_empty());
        let bucket = env_or("VAULTRELAY_STORE_BUCKET", "vault");
        let token = std::env::var("VAULTRELAY_STORE_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
        let timeout_secs = env_parse("VAULTRELAY_STORE_TIMEOUT_SECS", 30u64);
        let local_dir = PathBuf::from(env_or("VAULTRELAY_STORE_DIR", "vault_store"));
        Self {
            endpoint,
            bucket,
            token,
            timeout: Duration::from_secs(timeout_secs),
            local_dir,
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Path of the ingestion/retrieval log
    pub vault_log: PathBuf,
    /// Path of the verification log
    pub integrity_log: PathBuf,
    /// Number of verification records to keep after a monitor pass
    /// (0 disables trimming)
    pub integrity_log_keep: usize,
}

impl LogConfig {
    /// Load log configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            vault_log: PathBuf::from(env_or("VAULTRELAY_VAULT_LOG", "vault_log.jsonl")),
            integrity_log: PathBuf::from(env_or(
                "VAULTRELAY_INTEGRITY_LOG",
                "integrity_log.jsonl",
            )),
            integrity_log_keep: env_parse("VAULTRELAY_INTEGRITY_LOG_KEEP", 1000usize),
        }
    }
}
