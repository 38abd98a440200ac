//! Conversions from external infrastructure errors into domain errors.

use fieldsync_domain::{CrmError, CrmErrorKind, FieldSyncError};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub FieldSyncError);

impl From<InfraError> for FieldSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FieldSyncError> for InfraError {
    fn from(value: FieldSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoFieldSyncError {
    fn into_fieldsync(self) -> FieldSyncError;
}

/// Classify a failure as a provider-scoped [`CrmError`].
pub trait IntoCrmError {
    fn into_crm(self, provider: &str) -> CrmError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → FieldSyncError */
/* -------------------------------------------------------------------------- */

impl IntoFieldSyncError for HttpError {
    fn into_fieldsync(self) -> FieldSyncError {
        if self.is_builder() {
            return FieldSyncError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return FieldSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return FieldSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => FieldSyncError::Auth(message),
                404 => FieldSyncError::NotFound(message),
                400..=499 if code != 408 && code != 429 => FieldSyncError::InvalidInput(message),
                _ => FieldSyncError::Network(message),
            };
        }

        FieldSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_fieldsync())
    }
}

/* -------------------------------------------------------------------------- */
/* → CrmError */
/* -------------------------------------------------------------------------- */

impl IntoCrmError for HttpError {
    fn into_crm(self, provider: &str) -> CrmError {
        if self.is_timeout() {
            return CrmError::transient(provider, "HTTP request timed out");
        }

        if self.is_connect() {
            return CrmError::transient(provider, "HTTP connection failure");
        }

        if let Some(status) = self.status() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            return CrmError::from_status(provider, status.as_u16(), reason);
        }

        if self.is_decode() {
            return CrmError::permanent(provider, format!("malformed response body: {self}"));
        }

        CrmError::transient(provider, self.to_string())
    }
}

impl IntoCrmError for FieldSyncError {
    fn into_crm(self, provider: &str) -> CrmError {
        match self {
            FieldSyncError::Crm(err) => err,
            FieldSyncError::Network(msg) => CrmError::transient(provider, msg),
            FieldSyncError::Auth(msg) => CrmError::new(CrmErrorKind::Unauthorized, provider, msg),
            FieldSyncError::NotFound(msg) => CrmError::not_found(provider, msg),
            other => CrmError::permanent(provider, other.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
