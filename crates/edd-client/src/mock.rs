//! Scripted store for tests and local development
//!
//! Counts outbound calls so callers can assert on caching behavior.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::client::StoreApi;
use crate::error::{EddError, Result};
use crate::types::{LicenseRequest, LicenseResponse, UpdateParams, VersionInfo};

/// In-memory [`StoreApi`] that replays queued responses
#[derive(Default)]
pub struct MockStoreApi {
    responses: Mutex<Vec<LicenseResponse>>,
    version_info: Mutex<Option<VersionInfo>>,
    fail_transport: std::sync::atomic::AtomicBool,
    calls: AtomicUsize,
}

impl MockStoreApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response; queued responses are served oldest first, and the
    /// last one is repeated once the queue runs dry.
    pub fn push_response(&self, response: LicenseResponse) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn set_version_info(&self, info: VersionInfo) {
        *self.version_info.lock().unwrap() = Some(info);
    }

    /// Make every subsequent request fail as a transport error
    pub fn fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    /// Number of requests made against this mock
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<LicenseResponse> {
        if self.fail_transport.load(Ordering::SeqCst) {
            // Callers only care that an Err comes back, not the variant
            return Err(EddError::Config("simulated transport failure".into()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            Ok(responses.remove(0))
        } else {
            Ok(responses.first().cloned().unwrap_or_default())
        }
    }
}

#[async_trait]
impl StoreApi for MockStoreApi {
    async fn license_request(&self, _request: &LicenseRequest) -> Result<LicenseResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.next_response()
    }

    async fn version_request(&self, _params: &UpdateParams) -> Result<VersionInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(EddError::Config("simulated transport failure".into()));
        }
        Ok(self.version_info.lock().unwrap().clone().unwrap_or_default())
    }
}
