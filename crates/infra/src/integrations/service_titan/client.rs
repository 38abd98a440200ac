use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use fieldsync_core::{CrmProvider, CustomerLookup};
use fieldsync_domain::constants::IMAGE_ATTACHMENT_DESCRIPTION;
use fieldsync_domain::{
    CrmClientConfig, CrmContactData, CrmCredentials, CrmJobData, CrmResult, CrmType, DateRange,
    FieldSyncError,
};
use reqwest::{Method, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use super::auth::TokenCache;
use super::models::{
    AttachmentPayload, CustomerPayload, JobPayload, Page, RecordId, StCustomer, StJob,
};
use crate::errors::IntoCrmError;
use crate::http::HttpClient;
use crate::integrations::crm::attachments::download_image;
use crate::integrations::crm::wire::{
    endpoint, ensure_success, optional_json, parse_base_url, read_json,
};

const PROVIDER: &str = "ServiceTitan";
const APP_KEY_HEADER: &str = "ST-App-Key";
const TENANT_HEADER: &str = "ST-Tenant-ID";

/// ServiceTitan REST client
pub struct ServiceTitanIntegration {
    http: HttpClient,
    base_url: Url,
    tenant_id: String,
    app_key: Option<String>,
    tokens: TokenCache,
}

impl ServiceTitanIntegration {
    /// Build an adapter; `clientId`, `clientSecret` and `tenantId` are
    /// required, `appKey` is optional.
    pub fn new(
        credentials: &CrmCredentials,
        config: &CrmClientConfig,
    ) -> Result<Self, FieldSyncError> {
        let client_id = CrmCredentials::require(&credentials.client_id, "clientId", PROVIDER)?;
        let client_secret =
            CrmCredentials::require(&credentials.client_secret, "clientSecret", PROVIDER)?;
        let tenant_id = CrmCredentials::require(&credentials.tenant_id, "tenantId", PROVIDER)?;
        let app_key = credentials
            .app_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let http = HttpClient::from_config(&config.http)?;
        let tokens = TokenCache::new(
            http.clone(),
            PROVIDER,
            config.service_titan.auth_url.clone(),
            client_id,
            client_secret,
            Duration::from_secs(config.service_titan.token_expiry_margin_secs),
        );

        Ok(Self {
            http,
            base_url: parse_base_url(PROVIDER, &config.service_titan.api_base_url)?,
            tenant_id: tenant_id.to_string(),
            app_key,
            tokens,
        })
    }

    /// Request builder with a valid token and the tenant headers attached
    async fn request(&self, method: Method, segments: &[&str]) -> CrmResult<RequestBuilder> {
        let url = endpoint(PROVIDER, &self.base_url, segments)?;
        let token = self.tokens.access_token().await?;

        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(TENANT_HEADER, &self.tenant_id)
            .header("Accept", "application/json");
        if let Some(app_key) = &self.app_key {
            builder = builder.header(APP_KEY_HEADER, app_key);
        }

        Ok(builder)
    }

    async fn execute(&self, builder: RequestBuilder) -> CrmResult<Response> {
        self.http.send(builder).await.map_err(|err| err.into_crm(PROVIDER))
    }

    async fn execute_ok(&self, builder: RequestBuilder) -> CrmResult<Response> {
        let response = self.execute(builder).await?;
        ensure_success(PROVIDER, response).await
    }

    async fn find_by_id(&self, segments: &[&str]) -> CrmResult<Option<String>> {
        let response = self.execute(self.request(Method::GET, segments).await?).await?;
        let record: Option<RecordId> = optional_json(PROVIDER, response).await?;
        Ok(record.map(|r| r.id))
    }
}

#[async_trait]
impl CrmProvider for ServiceTitanIntegration {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn provider_type(&self) -> CrmType {
        CrmType::ServiceTitan
    }

    async fn authorize(&self) -> CrmResult<()> {
        self.tokens.access_token().await.map(|_| ())
    }

    async fn probe(&self) -> CrmResult<()> {
        let builder = self
            .request(Method::GET, &["settings", "technicians"])
            .await?
            .query(&[("pageSize", "1")]);
        self.execute_ok(builder).await.map(|_| ())
    }

    async fn get_customer(&self, id: &str) -> CrmResult<Option<String>> {
        self.find_by_id(&["crm", "customers", id]).await
    }

    async fn search_customer(&self, lookup: &CustomerLookup) -> CrmResult<Option<String>> {
        let builder = self
            .request(Method::GET, &["crm", "customers"])
            .await?
            .query(&[(lookup.field(), lookup.value()), ("pageSize", "1")]);
        let response = self.execute_ok(builder).await?;
        let page: Page<StCustomer> = read_json(PROVIDER, response).await?;

        Ok(page.data.into_iter().find_map(|customer| customer.id))
    }

    async fn create_customer(&self, contact: &CrmContactData) -> CrmResult<String> {
        let builder = self
            .request(Method::POST, &["crm", "customers"])
            .await?
            .json(&CustomerPayload::from(contact));
        let response = self.execute_ok(builder).await?;
        let record: RecordId = read_json(PROVIDER, response).await?;
        Ok(record.id)
    }

    async fn update_customer(&self, id: &str, contact: &CrmContactData) -> CrmResult<()> {
        let builder = self
            .request(Method::PUT, &["crm", "customers", id])
            .await?
            .json(&CustomerPayload::from(contact));
        self.execute_ok(builder).await.map(|_| ())
    }

    async fn get_job(&self, id: &str) -> CrmResult<Option<String>> {
        self.find_by_id(&["jpm", "jobs", id]).await
    }

    async fn create_job(&self, job: &CrmJobData) -> CrmResult<String> {
        let builder =
            self.request(Method::POST, &["jpm", "jobs"]).await?.json(&JobPayload::from(job));
        let response = self.execute_ok(builder).await?;
        let record: RecordId = read_json(PROVIDER, response).await?;
        Ok(record.id)
    }

    async fn update_job(&self, id: &str, job: &CrmJobData) -> CrmResult<()> {
        let builder = self
            .request(Method::PUT, &["jpm", "jobs", id])
            .await?
            .json(&JobPayload::from(job));
        self.execute_ok(builder).await.map(|_| ())
    }

    async fn upload_image(&self, job_id: &str, image_url: &str) -> CrmResult<()> {
        let image = download_image(&self.http, PROVIDER, image_url).await?;
        let payload = AttachmentPayload {
            file_name: &image.file_name,
            content_type: &image.content_type,
            description: IMAGE_ATTACHMENT_DESCRIPTION,
            data: BASE64.encode(&image.bytes),
        };

        let builder = self
            .request(Method::POST, &["jpm", "jobs", job_id, "attachments"])
            .await?
            .json(&payload);
        self.execute_ok(builder).await?;

        debug!(
            provider = PROVIDER,
            job_id,
            image_url,
            size = image.bytes.len(),
            "uploaded job attachment"
        );
        Ok(())
    }

    async fn list_jobs(
        &self,
        technician_id: &str,
        range: Option<&DateRange>,
    ) -> CrmResult<Vec<CrmJobData>> {
        let mut query = vec![("technicianId", technician_id.to_string())];
        if let Some(range) = range {
            query.push(("startsOnOrAfter", iso(range.start)));
            query.push(("startsBefore", iso(range.end)));
        }

        let builder = self.request(Method::GET, &["jpm", "jobs"]).await?.query(&query);
        let response = self.execute_ok(builder).await?;
        let page: Page<StJob> = read_json(PROVIDER, response).await?;

        debug!(provider = PROVIDER, technician_id, count = page.data.len(), "fetched jobs");
        Ok(page.data.into_iter().map(StJob::into_job).collect())
    }

    async fn list_customers(&self, query: Option<&str>) -> CrmResult<Vec<CrmContactData>> {
        let mut builder = self.request(Method::GET, &["crm", "customers"]).await?;
        if let Some(name) = query.map(str::trim).filter(|q| !q.is_empty()) {
            builder = builder.query(&[("name", name)]);
        }

        let response = self.execute_ok(builder).await?;
        let page: Page<StCustomer> = read_json(PROVIDER, response).await?;
        Ok(page.data.into_iter().map(StCustomer::into_contact).collect())
    }
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
