//! # FieldSync Infrastructure
//!
//! Infrastructure implementations of the core CRM ports.
//!
//! This crate contains:
//! - The Housecall Pro and ServiceTitan adapters
//! - The adapter factory and the caller-facing sync gateway
//! - The shared HTTP client and error conversions
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements `fieldsync_core::CrmProvider` for each provider
//! - Depends on `fieldsync-domain` and `fieldsync-core`
//! - Contains all "impure" code (network I/O, environment, files)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;

// Re-export commonly used items
pub use errors::{InfraError, IntoCrmError};
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::crm::{
    fetch_jobs_from_crm, get_integration, get_integration_with_config, get_supported_crms,
    sync_check_in_to_crm, test_crm_connection, CrmSyncGateway,
};
pub use integrations::housecall_pro::HousecallProIntegration;
pub use integrations::service_titan::ServiceTitanIntegration;
pub use observability::init_tracing;
