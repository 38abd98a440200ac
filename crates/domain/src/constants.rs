//! Application constants
//!
//! Centralized location for provider endpoints and sync defaults.

// Housecall Pro
pub const HOUSECALL_PRO_API_BASE_URL: &str = "https://api.housecallpro.com/v1";

// ServiceTitan
pub const SERVICE_TITAN_API_BASE_URL: &str = "https://api.servicetitan.io/v2";
pub const SERVICE_TITAN_AUTH_URL: &str = "https://auth.servicetitan.io/connect/token";
pub const SERVICE_TITAN_TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_USER_AGENT: &str = concat!("fieldsync/", env!("CARGO_PKG_VERSION"));

// Check-in mapping
pub const IMAGE_ATTACHMENT_DESCRIPTION: &str = "Check-in photo";
pub const UNKNOWN_CUSTOMER_NAME: &str = "Unknown Customer";
pub const METADATA_CUSTOMER_TYPE_KEY: &str = "customerType";
