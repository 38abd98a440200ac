use std::time::Duration;

use fieldsync_domain::constants::DEFAULT_USER_AGENT;
use fieldsync_domain::{FieldSyncError, HttpConfig};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with optional retry and timeout support.
///
/// Defaults to a single attempt per call; CRM calls are not retried unless
/// the configuration asks for it.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Build a client from the `http` section of the configuration.
    pub fn from_config(config: &HttpConfig) -> Result<Self, FieldSyncError> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_attempts(config.max_attempts)
            .user_agent(config.user_agent.clone())
            .build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send a request.
    ///
    /// With more than one attempt configured, 5xx answers and connection
    /// failures are retried with exponential backoff. Bodies that cannot be
    /// cloned (multipart uploads) go out exactly once.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, FieldSyncError> {
        let mut attempt = 1;

        loop {
            let current = match builder.try_clone() {
                Some(copy) if attempt < self.max_attempts => copy,
                _ => return self.dispatch(builder, attempt).await,
            };

            match self.dispatch(current, attempt).await {
                Ok(response) if response.status().is_server_error() => {
                    debug!(attempt, status = %response.status(), "server error, retrying");
                }
                Err(FieldSyncError::Network(reason)) => {
                    debug!(attempt, %reason, "transport failure, retrying");
                }
                other => return other,
            }

            self.backoff(attempt).await;
            attempt += 1;
        }
    }

    async fn dispatch(
        &self,
        builder: RequestBuilder,
        attempt: usize,
    ) -> Result<Response, FieldSyncError> {
        let request = builder.build().map_err(into_domain)?;
        let (method, url) = (request.method().clone(), request.url().clone());
        debug!(attempt, %method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(attempt, %method, %url, error = %err, "HTTP request failed");
            into_domain(err)
        })?;

        debug!(attempt, %method, %url, status = %response.status(), "received HTTP response");
        Ok(response)
    }

    /// Sleep `base_backoff * 2^(attempt - 1)`, capped at 2^8.
    async fn backoff(&self, attempt: usize) {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(8);
        let delay = self.base_backoff.saturating_mul(1u32 << exponent);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn into_domain(err: reqwest::Error) -> FieldSyncError {
    InfraError::from(err).into()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            base_backoff: Duration::from_millis(200),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient, FieldSyncError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(into_domain)?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}
