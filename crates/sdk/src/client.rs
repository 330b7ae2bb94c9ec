//! Maintenance Client Implementation

use crate::error::{Result, SdkError};
use async_trait::async_trait;
use cgsg_core::application::SetMaintenanceRequest;
use cgsg_core::domain::{MaintenanceRecord, MaintenanceStatus, PageKey};
use cgsg_core::port::{FetchError, MaintenanceStatusSource};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Per-request bound for admin calls and the read endpoint
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// `GET /healthz`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Client for the maintenance HTTP API.
///
/// Reads need no token. Admin calls send the bearer token given to
/// [`MaintenanceClient::with_token`].
///
/// # Example
///
/// ```no_run
/// use cgsg_core::domain::PageKey;
/// use cgsg_sdk::MaintenanceClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MaintenanceClient::new("http://127.0.0.1:8787")?;
/// let status = client.status(&PageKey::from_path("/news")).await?;
/// println!("news in maintenance: {}", status.is_maintenance);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MaintenanceClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    request_timeout: Duration,
}

impl MaintenanceClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8787`)
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Bearer token for admin calls
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let request = self.http.get(format!("{}/healthz", self.base_url));
        self.send_json(request).await
    }

    /// Maintenance status of one page (`GET /api/maintenance/{key}`)
    pub async fn status(&self, key: &PageKey) -> Result<MaintenanceStatus> {
        let request = self.http.get(status_url(&self.base_url, key));
        self.send_json(request).await
    }

    /// All maintenance records
    pub async fn list(&self) -> Result<Vec<MaintenanceRecord>> {
        let request = self
            .http
            .get(format!("{}/api/admin/maintenance", self.base_url));
        self.send_json(self.authorize(request)).await
    }

    /// Insert or update the record for `key`
    pub async fn set(&self, key: &PageKey, req: &SetMaintenanceRequest) -> Result<MaintenanceRecord> {
        let request = self.http.put(admin_url(&self.base_url, key)).json(req);
        self.send_json(self.authorize(request)).await
    }

    /// Remove the record for `key`. Returns whether one existed.
    pub async fn clear(&self, key: &PageKey) -> Result<bool> {
        let request = self.http.delete(admin_url(&self.base_url, key));
        match self.send(self.authorize(request)).await {
            Ok(_) => Ok(true),
            Err(SdkError::Api { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let timeout_ms = self.request_timeout.as_millis() as u64;

        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| SdkError::from_reqwest(e, timeout_ms))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let timeout_ms = self.request_timeout.as_millis() as u64;
        let bytes = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(|e| SdkError::from_reqwest(e, timeout_ms))?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl MaintenanceStatusSource for MaintenanceClient {
    async fn fetch_status(&self, key: &PageKey) -> std::result::Result<MaintenanceStatus, FetchError> {
        debug!(page_key = %key, "Fetching maintenance status");
        self.status(key).await.map_err(FetchError::from)
    }
}

pub(crate) fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SdkError::InvalidUrl(format!(
            "expected an http(s) URL, got '{}'",
            url
        )));
    }
    Ok(url.to_string())
}

fn status_url(base_url: &str, key: &PageKey) -> String {
    format!(
        "{}/api/maintenance/{}",
        base_url,
        urlencoding::encode(key.as_str())
    )
}

fn admin_url(base_url: &str, key: &PageKey) -> String {
    format!(
        "{}/api/admin/maintenance/{}",
        base_url,
        urlencoding::encode(key.as_str())
    )
}

fn api_error(status: StatusCode, body: &str) -> SdkError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => SdkError::Api {
            status: status.as_u16(),
            code: parsed.error.code,
            message: parsed.error.message,
        },
        Err(_) => SdkError::Api {
            status: status.as_u16(),
            code: String::new(),
            message: body.to_string(),
        },
    }
}
