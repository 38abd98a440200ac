//! CRM synchronization
//!
//! Ports implemented by the provider adapters, the check-in mapping, and the
//! provider-independent sync algorithms.

pub mod mapping;
pub mod ports;
pub mod service;
pub mod status;

pub use ports::{CrmIntegration, CrmProvider, CustomerLookup};
