//! Response handling and id decoding shared by the adapters

use fieldsync_domain::{CrmError, CrmResult, FieldSyncError};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::IntoCrmError;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Parse a configured API base URL; it must be able to carry a path.
pub(crate) fn parse_base_url(provider: &str, raw: &str) -> Result<Url, FieldSyncError> {
    let url = Url::parse(raw.trim()).map_err(|err| {
        FieldSyncError::Config(format!("Invalid {provider} API base URL '{raw}': {err}"))
    })?;
    if url.cannot_be_a_base() {
        return Err(FieldSyncError::Config(format!(
            "{provider} API base URL cannot carry a path: {raw}"
        )));
    }
    Ok(url)
}

/// `base` extended by `segments`, each percent-encoded as a single path
/// segment so record ids can never change the route.
pub(crate) fn endpoint(provider: &str, base: &Url, segments: &[&str]) -> CrmResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| CrmError::permanent(provider, format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Pass 2xx responses through; everything else becomes a classified error
/// carrying the (truncated) response body.
pub(crate) async fn ensure_success(provider: &str, response: Response) -> CrmResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body.chars().take(MAX_ERROR_BODY_CHARS).collect()
    };

    Err(CrmError::from_status(provider, status.as_u16(), message))
}

/// `Ok(None)` for 404, the decoded body for 2xx, an error otherwise.
pub(crate) async fn optional_json<T>(provider: &str, response: Response) -> CrmResult<Option<T>>
where
    T: DeserializeOwned,
{
    if response.status() == StatusCode::NOT_FOUND {
        debug!(provider, url = %response.url(), "record not found");
        return Ok(None);
    }

    let response = ensure_success(provider, response).await?;
    read_json(provider, response).await.map(Some)
}

/// Decode a successful response body.
pub(crate) async fn read_json<T>(provider: &str, response: Response) -> CrmResult<T>
where
    T: DeserializeOwned,
{
    response.json::<T>().await.map_err(|err| err.into_crm(provider))
}

/// Providers disagree on whether ids are strings or integers; both decode to
/// `String`.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

/// Optional variant of [`deserialize_id`]
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_id")] String);

    Option::<Wrapper>::deserialize(deserializer).map(|opt| opt.map(|Wrapper(id)| id))
}

/// Send numeric-looking ids as JSON numbers, anything else as a string.
pub(crate) fn id_value(id: &str) -> Value {
    id.parse::<i64>().map_or_else(|_| Value::String(id.to_string()), Value::from)
}
