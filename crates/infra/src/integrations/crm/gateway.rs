//! Caller-facing sync entry points
//!
//! The `try_*` methods return typed errors. The plain methods and the free
//! functions log every failure and collapse it to `false` or an empty list,
//! so a route handler never has to inspect provider errors. The free
//! functions share one gateway whose configuration is read once per process.

use fieldsync_core::CrmIntegration;
use fieldsync_domain::{
    CheckInData, CheckInSyncReport, CrmClientConfig, CrmCredentials, CrmJobData, DateRange,
    FieldSyncError, Result, SyncSettings,
};
use once_cell::sync::Lazy;
use tracing::{info, warn};

use super::factory::get_integration_with_config;
use crate::config;

static SHARED_GATEWAY: Lazy<CrmSyncGateway> =
    Lazy::new(|| CrmSyncGateway::new(config::shared().clone()));

/// Sync entry points bound to one configuration
#[derive(Debug, Clone, Default)]
pub struct CrmSyncGateway {
    config: CrmClientConfig,
}

impl CrmSyncGateway {
    pub fn new(config: CrmClientConfig) -> Self {
        Self { config }
    }

    /// Gateway over the process-wide configuration used by the free functions
    pub fn shared() -> &'static Self {
        &SHARED_GATEWAY
    }

    /// Gateway over a fresh read of the config file and environment; falls
    /// back to defaults (with a warning) when loading fails.
    pub fn from_env() -> Self {
        match config::load() {
            Ok(config) => Self::new(config),
            Err(err) => {
                warn!(error = %err, "failed to load CRM configuration, using defaults");
                Self::default()
            }
        }
    }

    pub fn config(&self) -> &CrmClientConfig {
        &self.config
    }

    fn integration(
        &self,
        crm_type: &str,
        credentials: &CrmCredentials,
    ) -> Result<Box<dyn CrmIntegration>> {
        get_integration_with_config(crm_type, credentials, &self.config)
    }

    /// Push one check-in and return what was written.
    pub async fn try_sync_check_in(
        &self,
        check_in: &CheckInData,
        crm_type: &str,
        credentials: &CrmCredentials,
        settings: &SyncSettings,
    ) -> Result<CheckInSyncReport> {
        let integration = self.integration(crm_type, credentials)?;
        let report = integration.sync_check_in(check_in, settings).await?;

        info!(
            provider = integration.name(),
            technician_id = %check_in.technician_id,
            customer_id = ?report.customer_id,
            job_id = ?report.job_id,
            images_attached = report.images_attached,
            images_failed = report.images_failed,
            "synced check-in to CRM"
        );
        Ok(report)
    }

    pub async fn sync_check_in_to_crm(
        &self,
        check_in: &CheckInData,
        crm_type: &str,
        credentials: &CrmCredentials,
        settings: &SyncSettings,
    ) -> bool {
        match self.try_sync_check_in(check_in, crm_type, credentials, settings).await {
            Ok(_) => true,
            Err(err) => {
                log_failure("check-in sync", crm_type, &err);
                false
            }
        }
    }

    /// Jobs assigned to `technician_id`, optionally limited to `range`.
    pub async fn try_fetch_jobs(
        &self,
        crm_type: &str,
        credentials: &CrmCredentials,
        technician_id: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<CrmJobData>> {
        let integration = self.integration(crm_type, credentials)?;
        Ok(integration.fetch_jobs(technician_id, range).await?)
    }

    pub async fn fetch_jobs_from_crm(
        &self,
        crm_type: &str,
        credentials: &CrmCredentials,
        technician_id: &str,
        range: Option<&DateRange>,
    ) -> Vec<CrmJobData> {
        match self.try_fetch_jobs(crm_type, credentials, technician_id, range).await {
            Ok(jobs) => jobs,
            Err(err) => {
                log_failure("job fetch", crm_type, &err);
                Vec::new()
            }
        }
    }

    pub async fn try_test_connection(
        &self,
        crm_type: &str,
        credentials: &CrmCredentials,
    ) -> Result<()> {
        let integration = self.integration(crm_type, credentials)?;
        Ok(integration.check_connection().await?)
    }

    pub async fn test_crm_connection(&self, crm_type: &str, credentials: &CrmCredentials) -> bool {
        match self.try_test_connection(crm_type, credentials).await {
            Ok(()) => true,
            Err(err) => {
                log_failure("connection test", crm_type, &err);
                false
            }
        }
    }
}

fn log_failure(operation: &str, crm_type: &str, err: &FieldSyncError) {
    match err {
        FieldSyncError::Crm(crm) => warn!(
            crm_type,
            provider = crm.provider(),
            kind = %crm.kind(),
            status = ?crm.status(),
            error = %crm,
            "CRM {operation} failed"
        ),
        other => warn!(crm_type, error = %other, "CRM {operation} failed"),
    }
}

/// Push one check-in using the default gateway; `false` on any failure.
pub async fn sync_check_in_to_crm(
    check_in: &CheckInData,
    crm_type: &str,
    credentials: &CrmCredentials,
    settings: &SyncSettings,
) -> bool {
    CrmSyncGateway::shared()
        .sync_check_in_to_crm(check_in, crm_type, credentials, settings)
        .await
}

/// Fetch a technician's jobs using the default gateway; empty on any failure.
pub async fn fetch_jobs_from_crm(
    crm_type: &str,
    credentials: &CrmCredentials,
    technician_id: &str,
    range: Option<&DateRange>,
) -> Vec<CrmJobData> {
    CrmSyncGateway::shared()
        .fetch_jobs_from_crm(crm_type, credentials, technician_id, range)
        .await
}

/// Check credentials using the default gateway.
pub async fn test_crm_connection(crm_type: &str, credentials: &CrmCredentials) -> bool {
    CrmSyncGateway::shared().test_crm_connection(crm_type, credentials).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_provider_collapses_to_false_and_empty() {
        let gateway = CrmSyncGateway::default();
        let credentials = CrmCredentials::api_key("key");

        assert!(
            !gateway
                .sync_check_in_to_crm(
                    &CheckInData::default(),
                    "fieldedge",
                    &credentials,
                    &SyncSettings::default()
                )
                .await
        );
        assert!(gateway.fetch_jobs_from_crm("fieldedge", &credentials, "t", None).await.is_empty());
        assert!(!gateway.test_crm_connection("fieldedge", &credentials).await);
    }

    #[tokio::test]
    async fn typed_variant_reports_missing_credentials() {
        let gateway = CrmSyncGateway::default();

        let err = gateway
            .try_test_connection("housecallpro", &CrmCredentials::default())
            .await
            .unwrap_err();

        assert!(matches!(err, FieldSyncError::Config(msg) if msg.contains("apiKey")));
    }
}
