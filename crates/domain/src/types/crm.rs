//! Canonical CRM records
//!
//! Every adapter maps its provider's payloads to and from these shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JsonMap;
use crate::impl_domain_status_conversions;

/// Residential vs. commercial customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Residential,
    Commercial,
}

impl_domain_status_conversions!(CustomerType {
    Residential => "residential",
    Commercial => "commercial",
});

/// Canonical job lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    OnHold,
}

impl_domain_status_conversions!(JobStatus {
    Scheduled => "scheduled",
    InProgress => "in_progress" | "in progress" | "in-progress" | "inprogress",
    Completed => "completed" | "complete",
    Cancelled => "cancelled" | "canceled",
    OnHold => "on_hold" | "on hold" | "on-hold" | "hold",
});

impl JobStatus {
    /// Parse a status string, returning `None` for anything outside the
    /// canonical vocabulary.
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

/// Canonical customer record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CrmContactData {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub customer_type: Option<CustomerType>,
    /// Provider id, present once the customer is matched or created
    pub external_id: Option<String>,
    pub notes: Option<String>,
    pub custom_fields: JsonMap,
}

impl CrmContactData {
    /// First/last name split at the first run of whitespace.
    ///
    /// Single-word names yield an empty last name.
    pub fn split_name(&self) -> (String, String) {
        let trimmed = self.name.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
            None => (trimmed.to_string(), String::new()),
        }
    }

    /// Phone reduced to ASCII digits, `None` when nothing is left.
    pub fn normalized_phone(&self) -> Option<String> {
        self.phone.as_deref().map(normalize_phone).filter(|digits| !digits.is_empty())
    }
}

/// Strip everything except ASCII digits from a phone number.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Canonical job/work-order record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CrmJobData {
    pub title: String,
    pub description: String,
    pub job_type: String,
    /// Canonical lowercase status; anything unrecognised is treated as
    /// unmapped by the adapters
    pub status: String,
    pub customer_id: String,
    pub customer_name: String,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub technician_id: Option<String>,
    pub technician_name: Option<String>,
    pub notes: Option<String>,
    pub images: Vec<String>,
    pub custom_fields: JsonMap,
    pub external_id: Option<String>,
}

impl CrmJobData {
    /// Parsed status, `None` when unmapped
    pub fn job_status(&self) -> Option<JobStatus> {
        JobStatus::parse(&self.status)
    }
}

/// Time window used when listing jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Outcome of a best-effort image upload pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentReport {
    pub attached: Vec<String>,
    pub failed: Vec<String>,
}

impl AttachmentReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// CRM-side identifiers produced by a check-in sync.
///
/// `None` means the corresponding step was disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInSyncReport {
    pub customer_id: Option<String>,
    pub job_id: Option<String>,
    pub images_attached: usize,
    pub images_failed: usize,
}
