//! ServiceTitan OAuth client-credentials token cache
//!
//! One cached token per adapter instance. The slot is a
//! `tokio::sync::Mutex` held across the refresh request, so concurrent callers
//! that find the token expired wait for a single refresh and then share its
//! result.

use std::time::{Duration, Instant};

use fieldsync_domain::{CrmError, CrmResult};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::IntoCrmError;
use crate::http::HttpClient;
use crate::integrations::crm::wire::{ensure_success, read_json};

/// Used when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 900;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Client-credentials exchange plus its single-slot cache
pub struct TokenCache {
    http: HttpClient,
    provider: &'static str,
    auth_url: String,
    client_id: String,
    client_secret: String,
    expiry_margin: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(
        http: HttpClient,
        provider: &'static str,
        auth_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        expiry_margin: Duration,
    ) -> Self {
        Self {
            http,
            provider,
            auth_url: auth_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            expiry_margin,
            slot: Mutex::new(None),
        }
    }

    /// A valid bearer token, requesting a new one when the cached token is
    /// missing or past its (margin-adjusted) expiry.
    pub async fn access_token(&self) -> CrmResult<String> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *slot = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> CrmResult<CachedToken> {
        debug!(provider = self.provider, auth_url = %self.auth_url, "requesting access token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let builder = self.http.request(Method::POST, &self.auth_url).form(&form);

        let response =
            self.http.send(builder).await.map_err(|err| err.into_crm(self.provider))?;
        let response = ensure_success(self.provider, response).await?;
        let body: TokenResponse = read_json(self.provider, response).await?;

        if body.access_token.trim().is_empty() {
            return Err(CrmError::permanent(
                self.provider,
                "token endpoint returned an empty token",
            ));
        }

        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS));
        let usable_for = lifetime.saturating_sub(self.expiry_margin);
        info!(
            provider = self.provider,
            expires_in_secs = lifetime.as_secs(),
            usable_for_secs = usable_for.as_secs(),
            "obtained access token"
        );

        let expires_at = expiry(Instant::now(), usable_for, self.expiry_margin);
        Ok(CachedToken { access_token: body.access_token, expires_at })
    }
}

/// `now + usable_for`, or the default lifetime when an absurd `expires_in`
/// would overflow the clock.
fn expiry(now: Instant, usable_for: Duration, margin: Duration) -> Instant {
    now.checked_add(usable_for)
        .or_else(|| {
            now.checked_add(Duration::from_secs(DEFAULT_TOKEN_LIFETIME_SECS).saturating_sub(margin))
        })
        .unwrap_or(now)
}
