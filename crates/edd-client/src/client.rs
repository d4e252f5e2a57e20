//! HTTP client for the licensing store
//!
//! One blocking concern only: a single GET with a 10 second timeout. A
//! timeout or transport error is terminal for the current request; there
//! is no retry and no backoff.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{EddError, Result};
use crate::types::{LicenseRequest, LicenseResponse, UpdateParams, VersionInfo};

/// Seconds before an outbound store request is abandoned
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Abstraction over the remote licensing store
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Perform a license lifecycle request (check/activate/deactivate)
    async fn license_request(&self, request: &LicenseRequest) -> Result<LicenseResponse>;

    /// Query the update feed for the latest release
    async fn version_request(&self, params: &UpdateParams) -> Result<VersionInfo>;
}

/// Client for a single EDD Software Licensing store
pub struct EddClient {
    http: reqwest::Client,
    store_url: String,
}

impl EddClient {
    /// Create a client with default settings (10s timeout, TLS verified)
    pub fn new(store_url: impl Into<String>) -> Result<Self> {
        Self::builder(store_url).build()
    }

    pub fn builder(store_url: impl Into<String>) -> EddClientBuilder {
        EddClientBuilder {
            store_url: store_url.into(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }

    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        pairs: &[(String, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(&self.store_url)
            .query(pairs)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Builder for [`EddClient`]
pub struct EddClientBuilder {
    store_url: String,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl EddClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disable TLS certificate verification.
    ///
    /// Only for stores running with self-signed certificates in local
    /// development. Verification stays on unless a host opts in here.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<EddClient> {
        if self.store_url.trim().is_empty() {
            return Err(EddError::Config("store URL must not be empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;

        Ok(EddClient {
            http,
            store_url: self.store_url,
        })
    }
}

#[async_trait]
impl StoreApi for EddClient {
    async fn license_request(&self, request: &LicenseRequest) -> Result<LicenseResponse> {
        tracing::debug!(
            action = request.action.as_str(),
            store = %self.store_url,
            "Sending license request"
        );

        let response: LicenseResponse = self.get_json(&request.query_pairs()).await?;

        tracing::debug!(
            action = request.action.as_str(),
            success = response.success,
            license = response.license_or_invalid(),
            "License request completed"
        );

        Ok(response)
    }

    async fn version_request(&self, params: &UpdateParams) -> Result<VersionInfo> {
        tracing::debug!(
            version = %params.version,
            store = %self.store_url,
            "Querying update feed"
        );

        self.get_json(&params.query_pairs()).await
    }
}
