use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::domain::entities::session::SESSION_TTL;
use crate::infrastructure::mtapi_client::{MtApiConfig, MTAPI_BASE};

/// Runtime configuration of the gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub api_base: Url,
    pub server_port: u16,          // Broker port sent with Connect
    pub session_ttl: Duration,     // Lifetime of a terminal session token
    pub remote_timeout: Duration,  // Upper bound for every terminal call
    pub accounts_file: PathBuf,
    pub max_body_bytes: usize,
    pub dry_run: bool, // Route orders to the in-memory terminal
    pub log_dir: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            api_base: Url::parse(MTAPI_BASE).expect("MTAPI_BASE is a valid URL"),
            server_port: 443,
            session_ttl: SESSION_TTL,
            remote_timeout: Duration::from_millis(10_000),
            accounts_file: PathBuf::from("config.json"),
            max_body_bytes: 64 * 1024,
            dry_run: false,
            log_dir: None,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GatewayConfig {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup, falling back to defaults
    /// for missing or invalid values
    pub fn from_lookup<F>(lookup: F) -> GatewayConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = GatewayConfig::default();

        if let Some(addr) = lookup("GATEWAY_LISTEN_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(value) => config.listen_addr = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse GATEWAY_LISTEN_ADDR '{}': {}, using default: {}",
                        addr,
                        e,
                        config.listen_addr
                    );
                }
            }
        }

        if let Some(base) = lookup("MT4_API_BASE") {
            match Url::parse(&base) {
                Ok(value) if value.scheme() == "http" || value.scheme() == "https" => {
                    config.api_base = value;
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid MT4_API_BASE scheme: {} (must be http or https), using default: {}",
                        value.scheme(),
                        config.api_base
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse MT4_API_BASE '{}': {}, using default: {}",
                        base,
                        e,
                        config.api_base
                    );
                }
            }
        }

        if let Some(port) = lookup("MT4_SERVER_PORT") {
            match port.parse::<u16>() {
                Ok(value) if value > 0 => config.server_port = value,
                _ => {
                    tracing::warn!(
                        "Invalid MT4_SERVER_PORT value: {}, using default: {}",
                        port,
                        config.server_port
                    );
                }
            }
        }

        if let Some(ttl) = lookup("SESSION_TTL_SECONDS") {
            match ttl.parse::<u64>() {
                Ok(value) if (60..=86_400).contains(&value) => {
                    config.session_ttl = Duration::from_secs(value);
                }
                _ => {
                    tracing::warn!(
                        "Invalid SESSION_TTL_SECONDS value: {} (must be between 60 and 86400), using default: {}",
                        ttl,
                        config.session_ttl.as_secs()
                    );
                }
            }
        }

        if let Some(timeout) = lookup("REMOTE_TIMEOUT_MILLISECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) if (1_000..=120_000).contains(&value) => {
                    config.remote_timeout = Duration::from_millis(value);
                }
                _ => {
                    tracing::warn!(
                        "Invalid REMOTE_TIMEOUT_MILLISECONDS value: {} (must be between 1000 and 120000), using default: {}",
                        timeout,
                        config.remote_timeout.as_millis()
                    );
                }
            }
        }

        if let Some(path) = lookup("ACCOUNTS_FILE") {
            if !path.trim().is_empty() {
                config.accounts_file = PathBuf::from(path.trim());
            }
        }

        if let Some(limit) = lookup("MAX_BODY_BYTES") {
            match limit.parse::<usize>() {
                Ok(value) if (1024..=10 * 1024 * 1024).contains(&value) => {
                    config.max_body_bytes = value;
                }
                _ => {
                    tracing::warn!(
                        "Invalid MAX_BODY_BYTES value: {} (must be between 1024 and 10485760), using default: {}",
                        limit,
                        config.max_body_bytes
                    );
                }
            }
        }

        if let Some(dry_run) = lookup("DRY_RUN") {
            config.dry_run = dry_run.to_lowercase() == "true" || dry_run == "1";
        }

        if let Some(dir) = lookup("LOG_DIR") {
            if !dir.trim().is_empty() {
                config.log_dir = Some(PathBuf::from(dir.trim()));
            }
        }

        config
    }

    pub fn mtapi(&self) -> MtApiConfig {
        MtApiConfig {
            api_base: self.api_base.clone(),
            server_port: self.server_port,
            timeout: self.remote_timeout,
        }
    }
}
