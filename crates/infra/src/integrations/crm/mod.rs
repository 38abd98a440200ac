//! CRM adapter plumbing shared by every provider
//!
//! # Architecture
//!
//! - **Adapters**: `HousecallProIntegration` and `ServiceTitanIntegration`
//!   implement `fieldsync_core::CrmProvider`; the resolve-or-create algorithms
//!   come from the blanket `CrmIntegration` impl in core
//! - **Factory**: [`get_integration`] builds an adapter from a provider key
//!   and per-call credentials
//! - **Gateway**: [`CrmSyncGateway`] and the free functions are the entry
//!   points a route handler calls; they collapse every failure to
//!   `false`/empty after logging it
//!
//! # Usage
//!
//! ```no_run
//! use fieldsync_domain::{CheckInData, CrmCredentials, SyncSettings};
//! use fieldsync_infra::integrations::crm::sync_check_in_to_crm;
//!
//! # async fn example(check_in: CheckInData) {
//! let credentials = CrmCredentials::api_key("hcp-key");
//! let settings = SyncSettings::default();
//! let ok = sync_check_in_to_crm(&check_in, "housecallpro", &credentials, &settings).await;
//! assert!(ok);
//! # }
//! ```

pub mod attachments;
pub mod factory;
pub mod gateway;
pub(crate) mod wire;

pub use factory::{get_integration, get_integration_with_config, get_supported_crms};
pub use gateway::{fetch_jobs_from_crm, sync_check_in_to_crm, test_crm_connection, CrmSyncGateway};
