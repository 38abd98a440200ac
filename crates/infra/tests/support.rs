//! Shared fixtures for the adapter integration tests.

use chrono::{TimeZone, Utc};
use fieldsync_domain::{CheckInData, CrmClientConfig, CrmCredentials};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Configuration pointing both providers at `server`.
pub fn mock_config(server: &MockServer) -> CrmClientConfig {
    let mut config = CrmClientConfig::default();
    config.housecall_pro.api_base_url = server.uri();
    config.service_titan.api_base_url = server.uri();
    config.service_titan.auth_url = format!("{}/connect/token", server.uri());
    config
}

pub fn hcp_credentials() -> CrmCredentials {
    CrmCredentials::api_key("hcp-test-key")
}

pub fn st_credentials() -> CrmCredentials {
    CrmCredentials::client_credentials("st-client", "st-secret", "tenant-9").with_app_key("app-1")
}

/// A completed check-in for a new residential customer.
pub fn check_in() -> CheckInData {
    CheckInData {
        technician_id: "tech-1".into(),
        company_id: "co-1".into(),
        job_type: "AC Tune-Up".into(),
        work_performed: Some("Cleaned coils, replaced filter".into()),
        customer_name: Some("Maria Lopez".into()),
        customer_email: Some("maria@example.com".into()),
        customer_phone: Some("(303) 555-0199".into()),
        address: Some("88 Pine Ave".into()),
        city: Some("Boulder".into()),
        state: Some("CO".into()),
        zip: Some("80301".into()),
        created_at: Utc.with_ymd_and_hms(2025, 6, 3, 15, 0, 0).unwrap(),
        completed_at: Some(Utc.with_ymd_and_hms(2025, 6, 3, 16, 15, 0).unwrap()),
        ..CheckInData::default()
    }
}

/// Image URLs served by `server`; `/images/missing.jpg` answers 404.
pub fn image_urls(server: &MockServer, names: &[&str]) -> Vec<String> {
    names.iter().map(|name| format!("{}/images/{name}", server.uri())).collect()
}

/// Serve `names` as JPEGs and `missing.jpg` as a 404.
pub async fn mount_images(server: &MockServer, names: &[&str]) {
    for name in names {
        Mock::given(method("GET"))
            .and(path(format!("/images/{name}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(JPEG_BYTES.to_vec(), "image/jpeg"),
            )
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/images/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}
