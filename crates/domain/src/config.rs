//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    HOUSECALL_PRO_API_BASE_URL, SERVICE_TITAN_API_BASE_URL, SERVICE_TITAN_AUTH_URL,
    SERVICE_TITAN_TOKEN_EXPIRY_MARGIN_SECS,
};

/// Sync layer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmClientConfig {
    pub http: HttpConfig,
    pub housecall_pro: HousecallProConfig,
    pub service_titan: ServiceTitanConfig,
    pub logging: LoggingConfig,
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Total attempts per request; 1 means no retries
    pub max_attempts: usize,
    pub user_agent: String,
}

/// Housecall Pro endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousecallProConfig {
    pub api_base_url: String,
}

/// ServiceTitan endpoints and token policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTitanConfig {
    pub api_base_url: String,
    pub auth_url: String,
    /// Cached tokens are considered expired this many seconds early
    pub token_expiry_margin_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for HousecallProConfig {
    fn default() -> Self {
        Self { api_base_url: HOUSECALL_PRO_API_BASE_URL.to_string() }
    }
}

impl Default for ServiceTitanConfig {
    fn default() -> Self {
        Self {
            api_base_url: SERVICE_TITAN_API_BASE_URL.to_string(),
            auth_url: SERVICE_TITAN_AUTH_URL.to_string(),
            token_expiry_margin_secs: SERVICE_TITAN_TOKEN_EXPIRY_MARGIN_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
