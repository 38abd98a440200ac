//! CRM provider identity and credentials

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FieldSyncError;

/// Supported CRM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrmType {
    ServiceTitan,
    HousecallPro,
}

impl CrmType {
    /// All providers in catalog order
    pub const ALL: [Self; 2] = [Self::ServiceTitan, Self::HousecallPro];

    /// Registry key used by callers (`servicetitan`, `housecallpro`)
    pub fn id(self) -> &'static str {
        match self {
            Self::ServiceTitan => "servicetitan",
            Self::HousecallPro => "housecallpro",
        }
    }

    /// Human-readable provider name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::ServiceTitan => "ServiceTitan",
            Self::HousecallPro => "Housecall Pro",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ServiceTitan => {
                "Sync customers, jobs and check-in photos with ServiceTitan using OAuth client \
                 credentials."
            }
            Self::HousecallPro => {
                "Sync customers, jobs and check-in photos with Housecall Pro using an API key."
            }
        }
    }

    /// Catalog entry for display
    pub fn catalog_entry(self) -> SupportedCrm {
        SupportedCrm {
            id: self.id().to_string(),
            name: self.display_name().to_string(),
            description: self.description().to_string(),
        }
    }
}

impl fmt::Display for CrmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CrmType {
    type Err = FieldSyncError;

    /// Case-insensitive; `-`, `_` and spaces are ignored so `Housecall-Pro`
    /// and `service_titan` resolve as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|crm| crm.id() == key)
            .ok_or_else(|| FieldSyncError::InvalidInput(format!("unsupported CRM type: {s}")))
    }
}

/// Catalog entry describing a supported CRM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedCrm {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Provider credentials, injected per call and never persisted here.
///
/// Which fields are required depends on the provider; adapters validate
/// presence at construction.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrmCredentials {
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
    pub app_key: Option<String>,
}

impl CrmCredentials {
    /// Housecall Pro style credentials
    pub fn api_key(key: impl Into<String>) -> Self {
        Self { api_key: Some(key.into()), ..Self::default() }
    }

    /// ServiceTitan style credentials
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            tenant_id: Some(tenant_id.into()),
            ..Self::default()
        }
    }

    pub fn with_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = Some(app_key.into());
        self
    }

    /// Return a required, non-blank field or a `Config` error naming it.
    pub fn require<'a>(
        value: &'a Option<String>,
        field: &str,
        provider: &str,
    ) -> Result<&'a str, FieldSyncError> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
            FieldSyncError::Config(format!(
                "{provider} credentials are missing required field '{field}'"
            ))
        })
    }
}

impl fmt::Debug for CrmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<redacted>"
            } else {
                "<none>"
            }
        }

        f.debug_struct("CrmCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("tenant_id", &self.tenant_id)
            .field("app_key", &redact(&self.app_key))
            .finish()
    }
}
