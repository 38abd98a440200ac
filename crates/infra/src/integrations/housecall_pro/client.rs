use async_trait::async_trait;
use chrono::NaiveDate;
use fieldsync_core::{CrmProvider, CustomerLookup};
use fieldsync_domain::constants::IMAGE_ATTACHMENT_DESCRIPTION;
use fieldsync_domain::{
    CrmClientConfig, CrmContactData, CrmCredentials, CrmJobData, CrmResult, CrmType, DateRange,
    FieldSyncError,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use super::models::{CustomerList, CustomerPayload, JobList, JobPayload, RecordId};
use crate::errors::IntoCrmError;
use crate::http::HttpClient;
use crate::integrations::crm::attachments::download_image;
use crate::integrations::crm::wire::{
    endpoint, ensure_success, optional_json, parse_base_url, read_json,
};

const PROVIDER: &str = "Housecall Pro";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Housecall Pro REST client
pub struct HousecallProIntegration {
    http: HttpClient,
    base_url: Url,
    api_key: String,
}

impl HousecallProIntegration {
    /// Build an adapter; fails when `api_key` is missing or blank.
    pub fn new(
        credentials: &CrmCredentials,
        config: &CrmClientConfig,
    ) -> Result<Self, FieldSyncError> {
        let api_key = CrmCredentials::require(&credentials.api_key, "apiKey", PROVIDER)?;

        Ok(Self {
            http: HttpClient::from_config(&config.http)?,
            base_url: parse_base_url(PROVIDER, &config.housecall_pro.api_base_url)?,
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method, segments: &[&str]) -> CrmResult<RequestBuilder> {
        let url = endpoint(PROVIDER, &self.base_url, segments)?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json"))
    }

    async fn execute(&self, builder: RequestBuilder) -> CrmResult<Response> {
        self.http.send(builder).await.map_err(|err| err.into_crm(PROVIDER))
    }

    async fn execute_ok(&self, builder: RequestBuilder) -> CrmResult<Response> {
        let response = self.execute(builder).await?;
        ensure_success(PROVIDER, response).await
    }
}

#[async_trait]
impl CrmProvider for HousecallProIntegration {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn provider_type(&self) -> CrmType {
        CrmType::HousecallPro
    }

    async fn authorize(&self) -> CrmResult<()> {
        Ok(())
    }

    async fn probe(&self) -> CrmResult<()> {
        let builder = self.request(Method::GET, &["customers"])?.query(&[("limit", "1")]);
        self.execute_ok(builder).await.map(|_| ())
    }

    async fn get_customer(&self, id: &str) -> CrmResult<Option<String>> {
        let response = self.execute(self.request(Method::GET, &["customers", id])?).await?;
        let record: Option<RecordId> = optional_json(PROVIDER, response).await?;
        Ok(record.map(|r| r.id))
    }

    async fn search_customer(&self, lookup: &CustomerLookup) -> CrmResult<Option<String>> {
        let builder =
            self.request(Method::GET, &["customers"])?.query(&[(lookup.field(), lookup.value())]);
        let response = self.execute_ok(builder).await?;
        let list: CustomerList = read_json(PROVIDER, response).await?;

        Ok(list.customers.into_iter().find_map(|customer| customer.id))
    }

    async fn create_customer(&self, contact: &CrmContactData) -> CrmResult<String> {
        let builder =
            self.request(Method::POST, &["customers"])?.json(&CustomerPayload::from(contact));
        let response = self.execute_ok(builder).await?;
        let record: RecordId = read_json(PROVIDER, response).await?;
        Ok(record.id)
    }

    async fn update_customer(&self, id: &str, contact: &CrmContactData) -> CrmResult<()> {
        let builder = self
            .request(Method::PUT, &["customers", id])?
            .json(&CustomerPayload::from(contact));
        self.execute_ok(builder).await.map(|_| ())
    }

    async fn get_job(&self, id: &str) -> CrmResult<Option<String>> {
        let response = self.execute(self.request(Method::GET, &["jobs", id])?).await?;
        let record: Option<RecordId> = optional_json(PROVIDER, response).await?;
        Ok(record.map(|r| r.id))
    }

    async fn create_job(&self, job: &CrmJobData) -> CrmResult<String> {
        let builder = self.request(Method::POST, &["jobs"])?.json(&JobPayload::from(job));
        let response = self.execute_ok(builder).await?;
        let record: RecordId = read_json(PROVIDER, response).await?;
        Ok(record.id)
    }

    async fn update_job(&self, id: &str, job: &CrmJobData) -> CrmResult<()> {
        let builder = self.request(Method::PUT, &["jobs", id])?.json(&JobPayload::from(job));
        self.execute_ok(builder).await.map(|_| ())
    }

    async fn upload_image(&self, job_id: &str, image_url: &str) -> CrmResult<()> {
        let image = download_image(&self.http, PROVIDER, image_url).await?;
        let size = image.bytes.len();

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|err| err.into_crm(PROVIDER))?;
        let form = Form::new().part("file", part).text("description", IMAGE_ATTACHMENT_DESCRIPTION);

        let builder =
            self.request(Method::POST, &["jobs", job_id, "attachments"])?.multipart(form);
        self.execute_ok(builder).await?;

        debug!(provider = PROVIDER, job_id, image_url, size, "uploaded job attachment");
        Ok(())
    }

    async fn list_jobs(
        &self,
        technician_id: &str,
        range: Option<&DateRange>,
    ) -> CrmResult<Vec<CrmJobData>> {
        let mut query = vec![("employee_id", technician_id.to_string())];
        if let Some(range) = range {
            query.push(("scheduled_start_min", range.start.format(DATE_FORMAT).to_string()));
            query.push(("scheduled_start_max", last_day(range).format(DATE_FORMAT).to_string()));
        }

        let response = self.execute_ok(self.request(Method::GET, &["jobs"])?.query(&query)).await?;
        let list: JobList = read_json(PROVIDER, response).await?;

        debug!(provider = PROVIDER, technician_id, count = list.jobs.len(), "fetched jobs");
        Ok(list.jobs.into_iter().map(|job| job.into_job()).collect())
    }

    async fn list_customers(&self, query: Option<&str>) -> CrmResult<Vec<CrmContactData>> {
        let mut builder = self.request(Method::GET, &["customers"])?;
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            builder = builder.query(&[("q", q)]);
        }

        let response = self.execute_ok(builder).await?;
        let list: CustomerList = read_json(PROVIDER, response).await?;
        Ok(list.customers.into_iter().map(|customer| customer.into_contact()).collect())
    }
}

/// Housecall Pro filters by inclusive calendar dates; this is the last day
/// holding an instant before the exclusive `range.end`.
fn last_day(range: &DateRange) -> NaiveDate {
    let end = range.end.checked_sub_signed(chrono::Duration::nanoseconds(1)).unwrap_or(range.end);
    end.date_naive().max(range.start.date_naive())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fieldsync_domain::CrmErrorKind;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> HousecallProIntegration {
        let mut config = CrmClientConfig::default();
        config.housecall_pro.api_base_url = server.uri();
        HousecallProIntegration::new(&CrmCredentials::api_key("hcp-key"), &config).unwrap()
    }

    #[test]
    fn requires_api_key() {
        let err = HousecallProIntegration::new(
            &CrmCredentials::default(),
            &CrmClientConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, FieldSyncError::Config(msg) if msg.contains("apiKey")));

        let blank = CrmCredentials::api_key("   ");
        assert!(HousecallProIntegration::new(&blank, &CrmClientConfig::default()).is_err());
    }

    #[tokio::test]
    async fn probe_sends_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers"))
            .and(query_param("limit", "1"))
            .and(header("authorization", "Bearer hcp-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "customers": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).probe().await.unwrap();
    }

    #[tokio::test]
    async fn missing_customer_is_none_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers/cus_404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(client(&server).get_customer("cus_404").await.unwrap(), None);
    }

    #[tokio::test]
    async fn search_returns_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers"))
            .and(query_param("phone", "5550100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "customers": [{ "id": "cus_1" }, { "id": "cus_2" }]
            })))
            .mount(&server)
            .await;

        let found =
            client(&server).search_customer(&CustomerLookup::Phone("5550100".into())).await;
        assert_eq!(found.unwrap().as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn rejected_create_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(422).set_body_string("email is invalid"))
            .mount(&server)
            .await;

        let contact = CrmContactData { name: "Pat".into(), ..CrmContactData::default() };
        let err = client(&server).create_customer(&contact).await.unwrap_err();

        assert_eq!(err.kind(), CrmErrorKind::Permanent);
        assert_eq!(err.status(), Some(422));
        assert!(err.message().contains("email is invalid"));
    }

    #[tokio::test]
    async fn record_ids_are_encoded_as_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/job%2F7%3Fpage=2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "job/7?page=2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = client(&server).get_job("job/7?page=2").await.unwrap();
        assert_eq!(found.as_deref(), Some("job/7?page=2"));
    }

    #[test]
    fn range_end_is_exclusive_when_sent_as_dates() {
        let day = |d, h| Utc.with_ymd_and_hms(2025, 6, d, h, 0, 0).unwrap();
        let date = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();

        assert_eq!(last_day(&DateRange::new(day(1, 0), day(30, 0))), date(29));
        assert_eq!(last_day(&DateRange::new(day(1, 0), day(30, 12))), date(30));
        assert_eq!(last_day(&DateRange::new(day(5, 9), day(5, 9))), date(5));
    }
}
