//! Error types used throughout the application

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FieldSync
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "message")]
pub enum FieldSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Crm(CrmError),
}

/// Result type alias for FieldSync operations
pub type Result<T> = std::result::Result<T, FieldSyncError>;

/// Result type alias for calls against a CRM provider
pub type CrmResult<T> = std::result::Result<T, CrmError>;

/// Classification of a failed CRM call.
///
/// Callers that only need the legacy success/failure contract can ignore the
/// kind; everything else can use it to decide whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmErrorKind {
    /// The referenced record does not exist (404)
    NotFound,
    /// Credentials were rejected (401, 403)
    Unauthorized,
    /// Provider throttled the request (429)
    RateLimited,
    /// Timeouts, connection failures, 408 and 5xx responses
    Transient,
    /// Everything else: validation errors, malformed responses, bad input
    Permanent,
}

impl CrmErrorKind {
    /// Classify an HTTP status code returned by a provider.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            408 | 500..=599 => Self::Transient,
            _ => Self::Permanent,
        }
    }

    /// Returns true if repeating the same request later could succeed
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient)
    }

    /// Stable label for logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

impl fmt::Display for CrmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call against a CRM provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmError {
    kind: CrmErrorKind,
    provider: String,
    status: Option<u16>,
    message: String,
}

impl CrmError {
    /// Create a new CRM error
    pub fn new(kind: CrmErrorKind, provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, provider: provider.into(), status: None, message: message.into() }
    }

    /// Build an error from a non-success HTTP response
    pub fn from_status(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: CrmErrorKind::from_status(status),
            provider: provider.into(),
            status: Some(status),
            message: body.into(),
        }
    }

    pub fn not_found(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(CrmErrorKind::NotFound, provider, message)
    }

    pub fn permanent(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(CrmErrorKind::Permanent, provider, message)
    }

    pub fn transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(CrmErrorKind::Transient, provider, message)
    }

    /// Attach the HTTP status code the provider answered with
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(&self) -> CrmErrorKind {
        self.kind
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Convert to the coarse domain error type
    pub fn into_domain_error(self) -> FieldSyncError {
        FieldSyncError::Crm(self)
    }
}

impl fmt::Display for CrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => {
                write!(f, "{} {} error (HTTP {}): {}", self.provider, self.kind, status, self.message)
            }
            None => write!(f, "{} {} error: {}", self.provider, self.kind, self.message),
        }
    }
}

impl std::error::Error for CrmError {}

impl From<CrmError> for FieldSyncError {
    fn from(value: CrmError) -> Self {
        value.into_domain_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        assert_eq!(CrmErrorKind::from_status(401), CrmErrorKind::Unauthorized);
        assert_eq!(CrmErrorKind::from_status(403), CrmErrorKind::Unauthorized);
        assert_eq!(CrmErrorKind::from_status(404), CrmErrorKind::NotFound);
        assert_eq!(CrmErrorKind::from_status(429), CrmErrorKind::RateLimited);
        assert_eq!(CrmErrorKind::from_status(408), CrmErrorKind::Transient);
        assert_eq!(CrmErrorKind::from_status(503), CrmErrorKind::Transient);
        assert_eq!(CrmErrorKind::from_status(422), CrmErrorKind::Permanent);
    }

    #[test]
    fn only_throttling_and_transient_failures_are_retryable() {
        assert!(CrmErrorKind::RateLimited.is_retryable());
        assert!(CrmErrorKind::Transient.is_retryable());
        assert!(!CrmErrorKind::Unauthorized.is_retryable());
        assert!(!CrmErrorKind::NotFound.is_retryable());
        assert!(!CrmErrorKind::Permanent.is_retryable());
    }

    #[test]
    fn display_includes_provider_and_status() {
        let err = CrmError::from_status("Housecall Pro", 401, "invalid api key");
        let rendered = err.to_string();
        assert!(rendered.contains("Housecall Pro"));
        assert!(rendered.contains("401"));
        assert!(rendered.contains("unauthorized"));
    }

    #[test]
    fn converts_into_domain_error() {
        let err: FieldSyncError = CrmError::transient("ServiceTitan", "timed out").into();
        match err {
            FieldSyncError::Crm(inner) => assert_eq!(inner.kind(), CrmErrorKind::Transient),
            other => panic!("expected crm error, got {other:?}"),
        }
    }
}
