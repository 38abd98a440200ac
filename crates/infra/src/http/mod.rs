//! HTTP client shared by every CRM adapter

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
