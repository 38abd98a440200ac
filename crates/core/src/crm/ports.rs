//! Port interfaces for CRM synchronization
//!
//! `CrmProvider` is what each adapter implements: one method per REST
//! primitive, carrying the provider's field-name quirks. `CrmIntegration` is
//! the uniform capability set callers use; it is implemented once for every
//! provider so the resolve-or-create skeleton is not duplicated per CRM.

use async_trait::async_trait;
use fieldsync_domain::{
    AttachmentReport, CheckInData, CheckInSyncReport, CrmContactData, CrmJobData, CrmResult,
    CrmType, CustomerMatchStrategy, DateRange, SyncSettings,
};
use tracing::warn;

use super::service;

/// A single customer search criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerLookup {
    Email(String),
    /// Digits only
    Phone(String),
    /// Full name, first and last concatenated
    Name(String),
}

impl CustomerLookup {
    /// Search criteria for `contact` in resolution order (email, phone,
    /// name), restricted to what `strategy` allows. Blank values are skipped.
    pub fn candidates(contact: &CrmContactData, strategy: CustomerMatchStrategy) -> Vec<Self> {
        let mut lookups = Vec::with_capacity(3);

        if strategy.matches_email() {
            if let Some(email) = contact.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
                lookups.push(Self::Email(email.to_string()));
            }
        }
        if strategy.matches_phone() {
            if let Some(phone) = contact.normalized_phone() {
                lookups.push(Self::Phone(phone));
            }
        }
        if strategy.matches_name() {
            let (first, last) = contact.split_name();
            let full = format!("{first} {last}").trim().to_string();
            if !full.is_empty() {
                lookups.push(Self::Name(full));
            }
        }

        lookups
    }

    /// Query parameter name shared by both supported providers
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
            Self::Name(_) => "name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Email(v) | Self::Phone(v) | Self::Name(v) => v,
        }
    }
}

/// Provider-specific REST primitives.
///
/// Lookups return `Ok(None)` when the record does not exist; only transport
/// and API failures are errors.
#[async_trait]
pub trait CrmProvider: Send + Sync {
    /// Human-readable provider name used in logs and errors
    fn provider_name(&self) -> &'static str;

    fn provider_type(&self) -> CrmType;

    /// Make sure the adapter holds valid credentials for the next call
    async fn authorize(&self) -> CrmResult<()>;

    /// One lightweight read proving the credentials work
    async fn probe(&self) -> CrmResult<()>;

    async fn get_customer(&self, id: &str) -> CrmResult<Option<String>>;

    /// First matching customer id, no ranking among multiple matches
    async fn search_customer(&self, lookup: &CustomerLookup) -> CrmResult<Option<String>>;

    async fn create_customer(&self, contact: &CrmContactData) -> CrmResult<String>;

    /// Full update with every mapped field
    async fn update_customer(&self, id: &str, contact: &CrmContactData) -> CrmResult<()>;

    async fn get_job(&self, id: &str) -> CrmResult<Option<String>>;

    async fn create_job(&self, job: &CrmJobData) -> CrmResult<String>;

    async fn update_job(&self, id: &str, job: &CrmJobData) -> CrmResult<()>;

    /// Download one image and attach it to a job
    async fn upload_image(&self, job_id: &str, image_url: &str) -> CrmResult<()>;

    async fn list_jobs(
        &self,
        technician_id: &str,
        range: Option<&DateRange>,
    ) -> CrmResult<Vec<CrmJobData>>;

    async fn list_customers(&self, query: Option<&str>) -> CrmResult<Vec<CrmContactData>>;
}

/// Uniform CRM capability set
#[async_trait]
pub trait CrmIntegration: Send + Sync {
    fn name(&self) -> &'static str;

    fn crm_type(&self) -> CrmType;

    async fn authenticate(&self) -> CrmResult<()>;

    /// Typed connectivity check
    async fn check_connection(&self) -> CrmResult<()>;

    /// `true` when the credentials work; every failure collapses to `false`
    async fn test_connection(&self) -> bool {
        match self.check_connection().await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    provider = self.name(),
                    kind = %err.kind(),
                    status = ?err.status(),
                    error = %err,
                    "CRM connection test failed"
                );
                false
            }
        }
    }

    /// Existing customer id for `contact`, if any
    async fn find_customer(
        &self,
        contact: &CrmContactData,
        strategy: CustomerMatchStrategy,
    ) -> CrmResult<Option<String>>;

    /// Resolve-or-create; returns the provider id either way
    async fn sync_customer(&self, contact: &CrmContactData) -> CrmResult<String>;

    /// Update by external id or create; images are attached best-effort
    /// after a create
    async fn sync_job(&self, job: &CrmJobData) -> CrmResult<String>;

    async fn attach_images(&self, job_id: &str, image_urls: &[String]) -> AttachmentReport;

    async fn fetch_jobs(
        &self,
        technician_id: &str,
        range: Option<&DateRange>,
    ) -> CrmResult<Vec<CrmJobData>>;

    async fn fetch_customers(&self, query: Option<&str>) -> CrmResult<Vec<CrmContactData>>;

    /// Push one check-in: customer first, then the job
    async fn sync_check_in(
        &self,
        check_in: &CheckInData,
        settings: &SyncSettings,
    ) -> CrmResult<CheckInSyncReport>;
}

#[async_trait]
impl<P> CrmIntegration for P
where
    P: CrmProvider + ?Sized,
{
    fn name(&self) -> &'static str {
        self.provider_name()
    }

    fn crm_type(&self) -> CrmType {
        self.provider_type()
    }

    async fn authenticate(&self) -> CrmResult<()> {
        self.authorize().await
    }

    async fn check_connection(&self) -> CrmResult<()> {
        self.probe().await
    }

    async fn find_customer(
        &self,
        contact: &CrmContactData,
        strategy: CustomerMatchStrategy,
    ) -> CrmResult<Option<String>> {
        service::find_customer(self, contact, strategy).await
    }

    async fn sync_customer(&self, contact: &CrmContactData) -> CrmResult<String> {
        service::sync_customer(self, contact).await
    }

    async fn sync_job(&self, job: &CrmJobData) -> CrmResult<String> {
        service::sync_job(self, job).await.map(|(id, _)| id)
    }

    async fn attach_images(&self, job_id: &str, image_urls: &[String]) -> AttachmentReport {
        service::attach_images(self, job_id, image_urls).await
    }

    async fn fetch_jobs(
        &self,
        technician_id: &str,
        range: Option<&DateRange>,
    ) -> CrmResult<Vec<CrmJobData>> {
        self.list_jobs(technician_id, range).await
    }

    async fn fetch_customers(&self, query: Option<&str>) -> CrmResult<Vec<CrmContactData>> {
        self.list_customers(query).await
    }

    async fn sync_check_in(
        &self,
        check_in: &CheckInData,
        settings: &SyncSettings,
    ) -> CrmResult<CheckInSyncReport> {
        service::sync_check_in(self, check_in, settings).await
    }
}
