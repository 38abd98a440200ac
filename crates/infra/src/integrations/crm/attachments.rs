//! Image download shared by the attachment uploads

use fieldsync_domain::CrmResult;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tracing::debug;

use super::wire::ensure_success;
use crate::errors::IntoCrmError;
use crate::http::HttpClient;

const DEFAULT_FILE_NAME: &str = "photo.jpg";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// A photo fetched from its source URL, ready to be re-uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Fetch one image. Non-2xx responses are errors.
pub async fn download_image(
    http: &HttpClient,
    provider: &str,
    url: &str,
) -> CrmResult<DownloadedImage> {
    let response = http
        .send(http.request(Method::GET, url))
        .await
        .map_err(|err| err.into_crm(provider))?;
    let response = ensure_success(provider, response).await?;

    let file_name = file_name_from_url(url);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| guess_content_type(&file_name).to_string());

    let bytes = response.bytes().await.map_err(|err| err.into_crm(provider))?.to_vec();
    debug!(provider, image_url = url, size = bytes.len(), "downloaded image");

    Ok(DownloadedImage { bytes, content_type, file_name })
}

/// Last non-empty path segment of `url`, or a generic name.
pub fn file_name_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
