//! Check-in to CRM record mapping

use fieldsync_domain::constants::{METADATA_CUSTOMER_TYPE_KEY, UNKNOWN_CUSTOMER_NAME};
use fieldsync_domain::{CheckInData, CrmContactData, CrmJobData, JobStatus, JsonMap, SyncSettings};

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Copy mapped metadata entries into a CRM custom-field bag.
///
/// Keys absent from the check-in metadata (or null) are skipped.
pub fn custom_fields(check_in: &CheckInData, settings: &SyncSettings) -> JsonMap {
    settings
        .custom_field_mapping
        .iter()
        .filter_map(|(internal, crm_field)| {
            check_in
                .metadata
                .get(internal)
                .filter(|value| !value.is_null())
                .map(|value| (crm_field.clone(), value.clone()))
        })
        .collect()
}

/// Build the customer record for a check-in.
pub fn contact_from_check_in(check_in: &CheckInData, settings: &SyncSettings) -> CrmContactData {
    CrmContactData {
        name: non_blank(check_in.customer_name.as_deref())
            .unwrap_or_else(|| UNKNOWN_CUSTOMER_NAME.to_string()),
        email: non_blank(check_in.customer_email.as_deref()),
        phone: non_blank(check_in.customer_phone.as_deref()),
        address: non_blank(check_in.address.as_deref()),
        unit: non_blank(check_in.unit.as_deref()),
        city: non_blank(check_in.city.as_deref()),
        state: non_blank(check_in.state.as_deref()),
        zip: non_blank(check_in.zip.as_deref()),
        country: non_blank(check_in.country.as_deref()),
        customer_type: check_in
            .metadata_str(METADATA_CUSTOMER_TYPE_KEY)
            .and_then(|raw| raw.parse().ok()),
        external_id: non_blank(check_in.customer_external_id.as_deref()),
        notes: non_blank(check_in.notes.as_deref()),
        custom_fields: custom_fields(check_in, settings),
    }
}

/// Build the job record for a check-in whose customer is `customer_id`.
pub fn job_from_check_in(
    check_in: &CheckInData,
    customer_id: &str,
    customer_name: &str,
    settings: &SyncSettings,
) -> CrmJobData {
    let job_type =
        non_blank(Some(check_in.job_type.as_str())).unwrap_or_else(|| "Service Visit".into());
    let status =
        if check_in.completed_at.is_some() { JobStatus::Completed } else { JobStatus::InProgress };

    CrmJobData {
        title: format!("{job_type} - {customer_name}"),
        description: non_blank(check_in.work_performed.as_deref())
            .or_else(|| non_blank(check_in.notes.as_deref()))
            .unwrap_or_default(),
        job_type,
        status: status.as_str().to_string(),
        customer_id: customer_id.to_string(),
        customer_name: customer_name.to_string(),
        location: check_in.formatted_address().or_else(|| check_in.coordinates()),
        start_date: Some(check_in.created_at),
        end_date: check_in.completed_at,
        technician_id: non_blank(Some(check_in.technician_id.as_str())),
        technician_name: None,
        notes: job_notes(check_in),
        images: if settings.sync_photos { check_in.photos.clone() } else { Vec::new() },
        custom_fields: custom_fields(check_in, settings),
        external_id: None,
    }
}

fn job_notes(check_in: &CheckInData) -> Option<String> {
    let mut lines = Vec::new();

    if let Some(notes) = non_blank(check_in.notes.as_deref()) {
        lines.push(notes);
    }
    if let Some(materials) = non_blank(check_in.materials_used.as_deref()) {
        lines.push(format!("Materials used: {materials}"));
    }
    if check_in.requires_billing == Some(true) {
        lines.push("Billing required".to_string());
    }
    if check_in.follow_up_required == Some(true) {
        lines.push("Follow-up required".to_string());
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fieldsync_domain::CustomerType;
    use serde_json::json;

    use super::*;

    fn check_in() -> CheckInData {
        let mut metadata = JsonMap::new();
        metadata.insert("warranty".into(), json!("extended"));
        metadata.insert("customerType".into(), json!("commercial"));
        metadata.insert("empty".into(), serde_json::Value::Null);

        CheckInData {
            technician_id: "tech-7".into(),
            company_id: "co-1".into(),
            job_type: "Water Heater Install".into(),
            notes: Some("Customer asked for a quote on a softener".into()),
            work_performed: Some("Replaced 50 gal tank".into()),
            materials_used: Some("50 gal tank, fittings".into()),
            customer_name: Some("Acme Dental".into()),
            customer_email: Some(" office@acme.test ".into()),
            customer_phone: Some("".into()),
            address: Some("500 Main St".into()),
            city: Some("Denver".into()),
            state: Some("CO".into()),
            zip: Some("80202".into()),
            photos: vec!["https://cdn.test/1.jpg".into()],
            created_at: Utc.with_ymd_and_hms(2025, 4, 2, 14, 0, 0).unwrap(),
            completed_at: Some(Utc.with_ymd_and_hms(2025, 4, 2, 16, 30, 0).unwrap()),
            follow_up_required: Some(true),
            metadata,
            ..CheckInData::default()
        }
    }

    fn settings() -> SyncSettings {
        let mut settings = SyncSettings::default();
        settings.custom_field_mapping.insert("warranty".into(), "Warranty Plan".into());
        settings.custom_field_mapping.insert("missing".into(), "Never Set".into());
        settings.custom_field_mapping.insert("empty".into(), "Null Field".into());
        settings
    }

    #[test]
    fn maps_contact_fields() {
        let contact = contact_from_check_in(&check_in(), &settings());

        assert_eq!(contact.name, "Acme Dental");
        assert_eq!(contact.email.as_deref(), Some("office@acme.test"));
        assert_eq!(contact.phone, None);
        assert_eq!(contact.city.as_deref(), Some("Denver"));
        assert_eq!(contact.customer_type, Some(CustomerType::Commercial));
        assert_eq!(contact.custom_fields.len(), 1);
        assert_eq!(contact.custom_fields["Warranty Plan"], json!("extended"));
    }

    #[test]
    fn anonymous_check_in_gets_placeholder_name() {
        let contact = contact_from_check_in(&CheckInData::default(), &SyncSettings::default());
        assert_eq!(contact.name, UNKNOWN_CUSTOMER_NAME);
    }

    #[test]
    fn maps_completed_job() {
        let job = job_from_check_in(&check_in(), "cust-1", "Acme Dental", &settings());

        assert_eq!(job.title, "Water Heater Install - Acme Dental");
        assert_eq!(job.description, "Replaced 50 gal tank");
        assert_eq!(job.status, "completed");
        assert_eq!(job.customer_id, "cust-1");
        assert_eq!(job.location.as_deref(), Some("500 Main St, Denver, CO 80202"));
        assert_eq!(job.technician_id.as_deref(), Some("tech-7"));
        assert_eq!(job.images.len(), 1);
        let notes = job.notes.unwrap();
        assert!(notes.contains("Materials used: 50 gal tank, fittings"));
        assert!(notes.contains("Follow-up required"));
        assert!(!notes.contains("Billing required"));
    }

    #[test]
    fn open_check_in_is_in_progress_without_photos_when_disabled() {
        let mut check_in = check_in();
        check_in.completed_at = None;
        let settings = SyncSettings { sync_photos: false, ..SyncSettings::default() };

        let job = job_from_check_in(&check_in, "cust-1", "Acme Dental", &settings);
        assert_eq!(job.status, "in_progress");
        assert!(job.images.is_empty());
        assert!(job.end_date.is_none());
    }

    #[test]
    fn falls_back_to_coordinates_for_location() {
        let check_in = CheckInData {
            latitude: Some(39.74),
            longitude: Some(-104.99),
            ..CheckInData::default()
        };
        let job = job_from_check_in(&check_in, "c", "n", &SyncSettings::default());
        assert_eq!(job.location.as_deref(), Some("39.74,-104.99"));
        assert_eq!(job.title, "Service Visit - n");
    }
}
