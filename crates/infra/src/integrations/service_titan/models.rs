//! ServiceTitan request and response shapes

use chrono::{DateTime, Utc};
use fieldsync_core::StatusTable;
use fieldsync_domain::{CrmContactData, CrmJobData, CustomerType, JobStatus, JsonMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::integrations::crm::wire::{deserialize_id, deserialize_optional_id, id_value};

pub(crate) const STATUS_TABLE: StatusTable = StatusTable::new(
    &[
        (JobStatus::Scheduled, "Scheduled"),
        (JobStatus::InProgress, "InProgress"),
        (JobStatus::Completed, "Completed"),
        (JobStatus::Cancelled, "Canceled"),
        (JobStatus::OnHold, "Hold"),
    ],
    JobStatus::Scheduled,
);

/// `customFields` is a list of name/value pairs on the wire
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CustomField {
    pub name: String,
    pub value: Value,
}

fn custom_fields_to_wire(fields: &JsonMap) -> Vec<CustomField> {
    fields
        .iter()
        .map(|(name, value)| CustomField { name: name.clone(), value: value.clone() })
        .collect()
}

fn custom_fields_from_wire(fields: Vec<CustomField>) -> JsonMap {
    fields.into_iter().map(|field| (field.name, field.value)).collect()
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerPayload {
    name: String,
    #[serde(rename = "type")]
    customer_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<AddressPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contacts: Vec<ContactPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    custom_fields: Vec<CustomField>,
}

impl From<&CrmContactData> for CustomerPayload {
    fn from(contact: &CrmContactData) -> Self {
        let mut contacts = Vec::new();
        if let Some(email) = &contact.email {
            contacts.push(ContactPayload { kind: "Email", value: email.clone() });
        }
        if let Some(phone) = &contact.phone {
            contacts.push(ContactPayload { kind: "Phone", value: phone.clone() });
        }

        Self {
            name: contact.name.clone(),
            customer_type: match contact.customer_type {
                Some(CustomerType::Commercial) => "Commercial",
                _ => "Residential",
            },
            address: contact.address.as_ref().map(|street| AddressPayload {
                street: street.clone(),
                unit: contact.unit.clone(),
                city: contact.city.clone(),
                state: contact.state.clone(),
                zip: contact.zip.clone(),
                country: contact.country.clone(),
            }),
            contacts,
            notes: contact.notes.clone(),
            custom_fields: custom_fields_to_wire(&contact.custom_fields),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AddressPayload {
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactPayload {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobPayload {
    customer_id: Value,
    name: String,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_type_name: Option<String>,
    job_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    technician_ids: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    custom_fields: Vec<CustomField>,
}

impl From<&CrmJobData> for JobPayload {
    fn from(job: &CrmJobData) -> Self {
        Self {
            customer_id: id_value(&job.customer_id),
            name: job.title.clone(),
            summary: job.description.clone(),
            job_type_name: (!job.job_type.is_empty()).then(|| job.job_type.clone()),
            job_status: STATUS_TABLE.to_provider(&job.status),
            start: job.start_date,
            end: job.end_date,
            technician_ids: job.technician_id.as_deref().map(id_value).into_iter().collect(),
            location: job.location.clone(),
            notes: job.notes.clone(),
            custom_fields: custom_fields_to_wire(&job.custom_fields),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttachmentPayload<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub description: &'a str,
    /// Base64-encoded file content
    pub data: String,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RecordId {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

/// Paged list envelope used by every collection endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StCustomer {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<String>,
    pub address: Option<AddressPayload>,
    pub contacts: Vec<StContact>,
    pub notes: Option<String>,
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StContact {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl StCustomer {
    fn contact_value(&self, kind: &str) -> Option<String> {
        self.contacts
            .iter()
            .find(|contact| contact.kind.eq_ignore_ascii_case(kind))
            .map(|contact| contact.value.clone())
    }

    pub(crate) fn into_contact(self) -> CrmContactData {
        let email = self.contact_value("Email");
        let phone = self.contact_value("Phone").or_else(|| self.contact_value("MobilePhone"));
        let address = self.address.unwrap_or_default();

        CrmContactData {
            name: self.name.unwrap_or_default(),
            email,
            phone,
            address: Some(address.street).filter(|street| !street.is_empty()),
            unit: address.unit,
            city: address.city,
            state: address.state,
            zip: address.zip,
            country: address.country,
            customer_type: self.customer_type.and_then(|raw| raw.parse().ok()),
            external_id: self.id,
            notes: self.notes,
            custom_fields: custom_fields_from_wire(self.custom_fields),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StJob {
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub job_type_name: Option<String>,
    pub job_status: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub technician_id: Option<String>,
    pub technician_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub custom_fields: Vec<CustomField>,
}

impl StJob {
    pub(crate) fn into_job(self) -> CrmJobData {
        let status = self
            .job_status
            .as_deref()
            .map_or(JobStatus::Scheduled, |raw| STATUS_TABLE.from_provider(raw));

        CrmJobData {
            title: self.name.unwrap_or_default(),
            description: self.summary.unwrap_or_default(),
            job_type: self.job_type_name.unwrap_or_default(),
            status: status.as_str().to_string(),
            customer_id: self.customer_id.unwrap_or_default(),
            customer_name: self.customer_name.unwrap_or_default(),
            location: self.location,
            start_date: self.start,
            end_date: self.end,
            technician_id: self.technician_id,
            technician_name: self.technician_name,
            notes: self.notes,
            images: Vec::new(),
            custom_fields: custom_fields_from_wire(self.custom_fields),
            external_id: self.id,
        }
    }
}
