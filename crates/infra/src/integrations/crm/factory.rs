//! Adapter construction from a provider key

use fieldsync_core::CrmIntegration;
use fieldsync_domain::{CrmClientConfig, CrmCredentials, CrmType, FieldSyncError, SupportedCrm};
use tracing::debug;

use crate::config;
use crate::integrations::housecall_pro::HousecallProIntegration;
use crate::integrations::service_titan::ServiceTitanIntegration;

/// Build the adapter for `crm_type` using the process-wide configuration
/// (see [`config::shared`]).
///
/// # Errors
/// `InvalidInput` for an unknown provider key, `Config` when a required
/// credential is missing.
pub fn get_integration(
    crm_type: &str,
    credentials: &CrmCredentials,
) -> Result<Box<dyn CrmIntegration>, FieldSyncError> {
    let crm: CrmType = crm_type.parse()?;
    build(crm, credentials, config::shared())
}

/// Build the adapter for `crm_type` against an explicit configuration.
///
/// Provider keys are matched case-insensitively, ignoring `-`, `_` and
/// spaces.
pub fn get_integration_with_config(
    crm_type: &str,
    credentials: &CrmCredentials,
    config: &CrmClientConfig,
) -> Result<Box<dyn CrmIntegration>, FieldSyncError> {
    build(crm_type.parse()?, credentials, config)
}

fn build(
    crm: CrmType,
    credentials: &CrmCredentials,
    config: &CrmClientConfig,
) -> Result<Box<dyn CrmIntegration>, FieldSyncError> {
    debug!(crm = %crm, "building CRM integration");

    let integration: Box<dyn CrmIntegration> = match crm {
        CrmType::HousecallPro => Box::new(HousecallProIntegration::new(credentials, config)?),
        CrmType::ServiceTitan => Box::new(ServiceTitanIntegration::new(credentials, config)?),
    };

    Ok(integration)
}

/// Catalog of every provider this build can talk to
pub fn get_supported_crms() -> Vec<SupportedCrm> {
    CrmType::ALL.into_iter().map(CrmType::catalog_entry).collect()
}
