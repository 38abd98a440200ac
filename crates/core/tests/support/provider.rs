use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use fieldsync_core::CrmProvider;
use fieldsync_core::CustomerLookup;
use fieldsync_domain::{
    CrmContactData, CrmError, CrmJobData, CrmResult, CrmType, DateRange,
};

const PROVIDER: &str = "Mock CRM";

#[derive(Default)]
struct MockState {
    customers: Vec<(String, CrmContactData)>,
    jobs: Vec<(String, CrmJobData)>,
    calls: Vec<String>,
    failing_images: HashSet<String>,
    fail_creates: bool,
    next_id: u32,
}

impl MockState {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// In-memory `CrmProvider` that records every primitive call.
///
/// Calls are logged as `"<primitive>"` or `"<primitive>:<argument>"` so tests
/// can assert on the exact sequence the sync algorithms issue.
#[derive(Default)]
pub struct MockCrmProvider {
    state: Mutex<MockState>,
}

impl MockCrmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing customer.
    pub fn with_customer(self, id: &str, contact: CrmContactData) -> Self {
        self.state.lock().unwrap().customers.push((id.to_string(), contact));
        self
    }

    /// Seed an existing job.
    pub fn with_job(self, id: &str, job: CrmJobData) -> Self {
        self.state.lock().unwrap().jobs.push((id.to_string(), job));
        self
    }

    /// Make uploads of `url` fail.
    pub fn with_failing_image(self, url: &str) -> Self {
        self.state.lock().unwrap().failing_images.insert(url.to_string());
        self
    }

    /// Make every create call fail with a permanent error.
    pub fn with_failing_creates(self) -> Self {
        self.state.lock().unwrap().fail_creates = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    pub fn job(&self, id: &str) -> Option<CrmJobData> {
        let state = self.state.lock().unwrap();
        state.jobs.iter().find(|(job_id, _)| job_id == id).map(|(_, job)| job.clone())
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().unwrap().calls.push(call.into());
    }
}

#[async_trait]
impl CrmProvider for MockCrmProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn provider_type(&self) -> CrmType {
        CrmType::HousecallPro
    }

    async fn authorize(&self) -> CrmResult<()> {
        self.record("authorize");
        Ok(())
    }

    async fn probe(&self) -> CrmResult<()> {
        self.record("probe");
        Ok(())
    }

    async fn get_customer(&self, id: &str) -> CrmResult<Option<String>> {
        self.record(format!("get_customer:{id}"));
        let state = self.state.lock().unwrap();
        Ok(state.customers.iter().find(|(cid, _)| cid == id).map(|(cid, _)| cid.clone()))
    }

    async fn search_customer(&self, lookup: &CustomerLookup) -> CrmResult<Option<String>> {
        self.record(format!("search_customer:{}={}", lookup.field(), lookup.value()));
        let state = self.state.lock().unwrap();
        let found = state.customers.iter().find(|(_, contact)| match lookup {
            CustomerLookup::Email(email) => {
                contact.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email))
            }
            CustomerLookup::Phone(phone) => contact.normalized_phone().as_deref() == Some(phone),
            CustomerLookup::Name(name) => contact.name.eq_ignore_ascii_case(name),
        });
        Ok(found.map(|(id, _)| id.clone()))
    }

    async fn create_customer(&self, contact: &CrmContactData) -> CrmResult<String> {
        self.record("create_customer");
        let mut state = self.state.lock().unwrap();
        if state.fail_creates {
            return Err(CrmError::from_status(PROVIDER, 422, "customer rejected"));
        }
        let id = state.allocate_id("cust");
        state.customers.push((id.clone(), contact.clone()));
        Ok(id)
    }

    async fn update_customer(&self, id: &str, contact: &CrmContactData) -> CrmResult<()> {
        self.record(format!("update_customer:{id}"));
        let mut state = self.state.lock().unwrap();
        match state.customers.iter_mut().find(|(cid, _)| cid == id) {
            Some(entry) => {
                entry.1 = contact.clone();
                Ok(())
            }
            None => Err(CrmError::from_status(PROVIDER, 404, "customer not found")),
        }
    }

    async fn get_job(&self, id: &str) -> CrmResult<Option<String>> {
        self.record(format!("get_job:{id}"));
        let state = self.state.lock().unwrap();
        Ok(state.jobs.iter().find(|(jid, _)| jid == id).map(|(jid, _)| jid.clone()))
    }

    async fn create_job(&self, job: &CrmJobData) -> CrmResult<String> {
        self.record("create_job");
        let mut state = self.state.lock().unwrap();
        if state.fail_creates {
            return Err(CrmError::from_status(PROVIDER, 422, "job rejected"));
        }
        let id = state.allocate_id("job");
        state.jobs.push((id.clone(), job.clone()));
        Ok(id)
    }

    async fn update_job(&self, id: &str, job: &CrmJobData) -> CrmResult<()> {
        self.record(format!("update_job:{id}"));
        let mut state = self.state.lock().unwrap();
        match state.jobs.iter_mut().find(|(jid, _)| jid == id) {
            Some(entry) => {
                entry.1 = job.clone();
                Ok(())
            }
            None => Err(CrmError::from_status(PROVIDER, 404, "job not found")),
        }
    }

    async fn upload_image(&self, _job_id: &str, image_url: &str) -> CrmResult<()> {
        self.record(format!("upload_image:{image_url}"));
        if self.state.lock().unwrap().failing_images.contains(image_url) {
            return Err(CrmError::transient(PROVIDER, "image download failed"));
        }
        Ok(())
    }

    async fn list_jobs(
        &self,
        technician_id: &str,
        _range: Option<&DateRange>,
    ) -> CrmResult<Vec<CrmJobData>> {
        self.record(format!("list_jobs:{technician_id}"));
        let state = self.state.lock().unwrap();
        Ok(state
            .jobs
            .iter()
            .filter(|(_, job)| job.technician_id.as_deref() == Some(technician_id))
            .map(|(_, job)| job.clone())
            .collect())
    }

    async fn list_customers(&self, _query: Option<&str>) -> CrmResult<Vec<CrmContactData>> {
        self.record("list_customers");
        let state = self.state.lock().unwrap();
        Ok(state.customers.iter().map(|(_, contact)| contact.clone()).collect())
    }
}
