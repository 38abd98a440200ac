//! Shared test helpers for `fieldsync-core` integration tests.
//!
//! These helpers provide an in-memory provider so sync tests can focus on
//! behaviour instead of HTTP plumbing.

pub mod provider;
