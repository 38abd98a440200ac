//! # FieldSync Core
//!
//! Pure sync logic - no HTTP or storage dependencies.
//!
//! This crate contains:
//! - Port interfaces implemented by each CRM adapter
//! - Mapping from check-ins to canonical contact and job records
//! - The shared resolve-or-create and check-in orchestration algorithms
//!
//! ## Architecture Principles
//! - Only depends on `fieldsync-domain`
//! - No network code; adapters live in `fieldsync-infra`
//! - All provider calls go through the `CrmProvider` trait

pub mod crm;

pub use crm::mapping::{contact_from_check_in, job_from_check_in};
pub use crm::ports::{CrmIntegration, CrmProvider, CustomerLookup};
pub use crm::status::StatusTable;
