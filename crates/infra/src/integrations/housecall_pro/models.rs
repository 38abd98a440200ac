//! Housecall Pro request and response shapes

use chrono::{DateTime, Utc};
use fieldsync_core::StatusTable;
use fieldsync_domain::{CrmContactData, CrmJobData, CustomerType, JobStatus, JsonMap};
use serde::{Deserialize, Serialize};

use crate::integrations::crm::wire::{deserialize_id, deserialize_optional_id};

/// `work_status` vocabulary. First spelling per status is the one written.
pub(crate) const STATUS_TABLE: StatusTable = StatusTable::new(
    &[
        (JobStatus::Scheduled, "scheduled"),
        (JobStatus::InProgress, "in progress"),
        (JobStatus::Completed, "complete unrated"),
        (JobStatus::Completed, "complete rated"),
        (JobStatus::Cancelled, "pro canceled"),
        (JobStatus::Cancelled, "user canceled"),
        (JobStatus::OnHold, "unscheduled"),
    ],
    JobStatus::Scheduled,
);

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CustomerPayload {
    first_name: String,
    last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    addresses: Vec<AddressPayload>,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    custom_fields: JsonMap,
}

impl From<&CrmContactData> for CustomerPayload {
    fn from(contact: &CrmContactData) -> Self {
        let (first_name, last_name) = contact.split_name();
        let address = AddressPayload::from_contact(contact);

        Self {
            first_name,
            last_name,
            email: contact.email.clone(),
            mobile_number: contact.phone.clone(),
            company: (contact.customer_type == Some(CustomerType::Commercial))
                .then(|| contact.name.clone()),
            notes: contact.notes.clone(),
            addresses: address.into_iter().collect(),
            custom_fields: contact.custom_fields.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddressPayload {
    street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    street_line_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

impl AddressPayload {
    fn from_contact(contact: &CrmContactData) -> Option<Self> {
        let street = contact.address.clone()?;
        Some(Self {
            street,
            street_line_2: contact.unit.clone(),
            city: contact.city.clone(),
            state: contact.state.clone(),
            zip: contact.zip.clone(),
            country: contact.country.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JobPayload {
    customer_id: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    work_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<SchedulePayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    assigned_employee_ids: Vec<String>,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    custom_fields: JsonMap,
}

impl From<&CrmJobData> for JobPayload {
    fn from(job: &CrmJobData) -> Self {
        let notes = [Some(job.description.as_str()), job.notes.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            customer_id: job.customer_id.clone(),
            description: job.title.clone(),
            notes: (!notes.is_empty()).then_some(notes),
            work_status: STATUS_TABLE.to_provider(&job.status),
            job_type: (!job.job_type.is_empty()).then(|| job.job_type.clone()),
            schedule: job.start_date.map(|start| SchedulePayload {
                scheduled_start: start,
                scheduled_end: job.end_date,
            }),
            assigned_employee_ids: job.technician_id.iter().cloned().collect(),
            custom_fields: job.custom_fields.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SchedulePayload {
    scheduled_start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_end: Option<DateTime<Utc>>,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RecordId {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CustomerList {
    #[serde(default)]
    pub customers: Vec<HcpCustomer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HcpCustomer {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub home_number: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub addresses: Vec<HcpAddress>,
}

impl HcpCustomer {
    fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn into_contact(self) -> CrmContactData {
        let name = match self.full_name() {
            name if name.is_empty() => self.company.clone().unwrap_or_default(),
            name => name,
        };
        let address = self.addresses.into_iter().next().unwrap_or_default();

        CrmContactData {
            name,
            email: self.email,
            phone: self.mobile_number.or(self.home_number),
            address: address.street,
            unit: address.street_line_2,
            city: address.city,
            state: address.state,
            zip: address.zip,
            country: address.country,
            customer_type: Some(if self.company.is_some() {
                CustomerType::Commercial
            } else {
                CustomerType::Residential
            }),
            external_id: self.id,
            notes: self.notes,
            custom_fields: JsonMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HcpAddress {
    pub street: Option<String>,
    pub street_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl HcpAddress {
    fn formatted(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.street, &self.city, &self.state, &self.zip]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobList {
    #[serde(default)]
    pub jobs: Vec<HcpJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HcpJob {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub work_status: Option<String>,
    pub job_type: Option<String>,
    pub customer: Option<HcpCustomer>,
    pub address: Option<HcpAddress>,
    pub schedule: Option<HcpSchedule>,
    pub assigned_employees: Vec<HcpEmployee>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HcpSchedule {
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HcpEmployee {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl HcpJob {
    pub(crate) fn into_job(self) -> CrmJobData {
        let status = self
            .work_status
            .as_deref()
            .map_or(JobStatus::Scheduled, |raw| STATUS_TABLE.from_provider(raw));
        let (customer_id, customer_name) = self
            .customer
            .map(|customer| (customer.id.clone().unwrap_or_default(), customer.full_name()))
            .unwrap_or_default();
        let schedule = self.schedule.unwrap_or_default();
        let technician = self.assigned_employees.into_iter().next();

        CrmJobData {
            title: self.description.unwrap_or_default(),
            description: self.notes.clone().unwrap_or_default(),
            job_type: self.job_type.unwrap_or_default(),
            status: status.as_str().to_string(),
            customer_id,
            customer_name,
            location: self.address.as_ref().and_then(HcpAddress::formatted),
            start_date: schedule.scheduled_start,
            end_date: schedule.scheduled_end,
            technician_name: technician.as_ref().map(|employee| {
                [employee.first_name.as_deref(), employee.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
            }),
            technician_id: technician.and_then(|employee| employee.id),
            notes: self.notes,
            images: Vec::new(),
            custom_fields: JsonMap::new(),
            external_id: self.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn status_table_matches_housecall_vocabulary() {
        assert_eq!(STATUS_TABLE.to_provider("in_progress"), "in progress");
        assert_eq!(STATUS_TABLE.to_provider("completed"), "complete unrated");
        assert_eq!(STATUS_TABLE.to_provider("cancelled"), "pro canceled");
        assert_eq!(STATUS_TABLE.to_provider("on_hold"), "unscheduled");
        assert_eq!(STATUS_TABLE.to_provider("waiting on parts"), "scheduled");
        assert_eq!(STATUS_TABLE.from_provider("complete rated"), JobStatus::Completed);
        assert_eq!(STATUS_TABLE.from_provider("user canceled"), JobStatus::Cancelled);
    }

    #[test]
    fn customer_payload_splits_name_and_nests_address() {
        let contact = CrmContactData {
            name: "Mary Ann Smith".into(),
            email: Some("mary@example.com".into()),
            phone: Some("555-0100".into()),
            address: Some("9 Oak Ave".into()),
            unit: Some("Unit 2".into()),
            city: Some("Austin".into()),
            ..CrmContactData::default()
        };

        let body = serde_json::to_value(CustomerPayload::from(&contact)).unwrap();
        assert_eq!(body["first_name"], "Mary");
        assert_eq!(body["last_name"], "Ann Smith");
        assert_eq!(body["mobile_number"], "555-0100");
        assert_eq!(body["addresses"][0]["street_line_2"], "Unit 2");
        assert!(body.get("company").is_none());
        assert!(body.get("custom_fields").is_none());
    }

    #[test]
    fn job_payload_maps_status_and_schedule() {
        let job = CrmJobData {
            title: "Drain Cleaning - Mary".into(),
            description: "Cleared main line".into(),
            status: "in_progress".into(),
            customer_id: "cus_1".into(),
            technician_id: Some("pro_9".into()),
            start_date: Some(Utc.with_ymd_and_hms(2025, 1, 2, 15, 0, 0).unwrap()),
            ..CrmJobData::default()
        };

        let body = serde_json::to_value(JobPayload::from(&job)).unwrap();
        assert_eq!(body["description"], "Drain Cleaning - Mary");
        assert_eq!(body["notes"], "Cleared main line");
        assert_eq!(body["work_status"], "in progress");
        assert_eq!(body["assigned_employee_ids"], json!(["pro_9"]));
        assert_eq!(body["schedule"]["scheduled_start"], "2025-01-02T15:00:00Z");
    }

    #[test]
    fn job_response_maps_back_to_canonical_job() {
        let raw = json!({
            "id": "job_77",
            "description": "Tune-up",
            "work_status": "complete rated",
            "customer": { "id": "cus_1", "first_name": "Mary", "last_name": "Smith" },
            "address": { "street": "9 Oak Ave", "city": "Austin", "state": "TX", "zip": "78701" },
            "schedule": { "scheduled_start": "2025-01-02T15:00:00Z" },
            "assigned_employees": [{ "id": "pro_9", "first_name": "Sam", "last_name": "Lee" }]
        });

        let job = serde_json::from_value::<HcpJob>(raw).unwrap().into_job();
        assert_eq!(job.external_id.as_deref(), Some("job_77"));
        assert_eq!(job.status, "completed");
        assert_eq!(job.customer_id, "cus_1");
        assert_eq!(job.customer_name, "Mary Smith");
        assert_eq!(job.location.as_deref(), Some("9 Oak Ave, Austin, TX, 78701"));
        assert_eq!(job.technician_id.as_deref(), Some("pro_9"));
        assert_eq!(job.technician_name.as_deref(), Some("Sam Lee"));
    }
}
