//! Housecall Pro adapter
//!
//! Authenticates with a static API key sent as a bearer token. Photos are
//! uploaded as multipart attachments.

pub mod client;
mod models;

pub use client::HousecallProIntegration;
