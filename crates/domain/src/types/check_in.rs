//! Check-in records produced by technicians in the field

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JsonMap;

/// A completed (or in-progress) field-service visit.
///
/// Supplied by the caller as an immutable snapshot; the sync layer only reads
/// it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckInData {
    pub technician_id: String,
    pub company_id: String,
    pub job_type: String,
    pub notes: Option<String>,
    pub work_performed: Option<String>,
    pub materials_used: Option<String>,

    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    /// CRM id of the customer when the caller already stored one
    pub customer_external_id: Option<String>,

    pub address: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub photos: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    pub requires_billing: Option<bool>,
    pub follow_up_required: Option<bool>,

    /// Open bag consulted for custom-field mapping
    pub metadata: JsonMap,
}

impl CheckInData {
    /// Single-line address assembled from whichever components are present.
    pub fn formatted_address(&self) -> Option<String> {
        let street = match (non_blank(&self.address), non_blank(&self.unit)) {
            (Some(street), Some(unit)) => Some(format!("{street} {unit}")),
            (Some(street), None) => Some(street.to_string()),
            (None, unit) => unit.map(str::to_string),
        };
        let state_zip = match (non_blank(&self.state), non_blank(&self.zip)) {
            (Some(state), Some(zip)) => Some(format!("{state} {zip}")),
            (state, zip) => state.or(zip).map(str::to_string),
        };

        let parts: Vec<String> = [
            street,
            non_blank(&self.city).map(str::to_string),
            state_zip,
            non_blank(&self.country).map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// `"lat,lng"` when both coordinates are known
    pub fn coordinates(&self) -> Option<String> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(format!("{lat},{lng}")),
            _ => None,
        }
    }

    /// Look up a metadata value rendered as a string.
    ///
    /// Strings are returned as-is, numbers and booleans are formatted, nulls,
    /// arrays and objects yield `None`.
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
