//! ServiceTitan adapter
//!
//! Uses the OAuth client-credentials grant. Every API call carries the cached
//! bearer token plus the `ST-App-Key` and `ST-Tenant-ID` headers. Photos are
//! posted as base64 JSON attachments.

pub mod auth;
pub mod client;
mod models;

pub use auth::TokenCache;
pub use client::ServiceTitanIntegration;
