//! reqwest implementation of [`ObjectApi`]

use std::time::Duration;

use async_trait::async_trait;
use migrate_model::{Dashboard, Document, Monitor};
use migrate_store::{Config, Credential};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{MonitorUpdate, ObjectApi};
use crate::error::ClientError;
use crate::retry::RetryPolicy;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "DD-API-KEY";
/// Header carrying the application key
pub const APP_KEY_HEADER: &str = "DD-APPLICATION-KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// REST client for the v1 dashboard and monitor endpoints
#[derive(Debug, Clone)]
pub struct DatadogClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DatadogClient {
    /// Create a client for an API base URL such as `https://api.datadoghq.com`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client for the site named in the config
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.api_base_url())
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL requests are sent to
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    async fn request<B: Serialize + Sync>(
        &self,
        credential: &Credential,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.url(path);
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ClientError::Encode)?;

        let mut attempt = 0;
        loop {
            match self.send_once(credential, method.clone(), &url, body.clone()).await {
                Err(e) if self.retry.should_retry(&e, attempt) => {
                    let delay = self.retry.delay(attempt);
                    warn!(%url, attempt, ?delay, error = %e, "Retrying request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(
        &self,
        credential: &Credential,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ClientError> {
        let transport = |source| ClientError::Transport {
            url: url.to_string(),
            source,
        };

        let mut request = self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, &credential.api_key)
            .header(APP_KEY_HEADER, &credential.app_key)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let content = response.bytes().await.map_err(transport)?;
        debug!(%url, status = status.as_u16(), bytes = content.len(), "API response");

        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&content).into_owned(),
            });
        }
        Ok(content.to_vec())
    }
}

#[async_trait]
impl ObjectApi for DatadogClient {
    async fn get_dashboard(&self, credential: &Credential, id: &str) -> Result<Dashboard, ClientError> {
        let content = self
            .request::<()>(credential, Method::GET, &format!("dashboard/{id}"), None)
            .await?;
        Ok(Dashboard::from_json_slice(&content)?)
    }

    async fn get_monitor(&self, credential: &Credential, id: i64) -> Result<Monitor, ClientError> {
        let content = self
            .request::<()>(credential, Method::GET, &format!("monitor/{id}"), None)
            .await?;
        Ok(Monitor::from_json_slice(&content)?)
    }

    async fn update_dashboard(
        &self,
        credential: &Credential,
        id: &str,
        dashboard: &Dashboard,
    ) -> Result<(), ClientError> {
        self.request(credential, Method::PUT, &format!("dashboard/{id}"), Some(dashboard))
            .await?;
        Ok(())
    }

    async fn update_monitor(
        &self,
        credential: &Credential,
        id: i64,
        update: &MonitorUpdate,
    ) -> Result<(), ClientError> {
        self.request(credential, Method::PUT, &format!("monitor/{id}"), Some(update))
            .await?;
        Ok(())
    }
}
