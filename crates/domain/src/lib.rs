//! # FieldSync Domain
//!
//! Business domain types and models for FieldSync.
//!
//! This crate contains:
//! - Check-in, contact and job records exchanged with CRM providers
//! - Sync settings, credentials and the supported-CRM catalog
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other FieldSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
