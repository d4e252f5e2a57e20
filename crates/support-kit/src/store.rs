//! Settings store seam
//!
//! The host persists two kinds of values: durable options and transients
//! that expire after a TTL. License validity and license data share a one
//! day TTL; durable license key/status survive cache expirations.
//!
//! Writes are single-key sets assumed atomic at the storage layer.
//! Concurrent refreshes of the same transient are benign: the value is
//! externally sourced, so last-writer-wins converges.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::Result;

/// One day, the shared TTL for license validity and license data
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Durable options plus expiring transients
pub trait SettingsStore: Send + Sync {
    fn get_option(&self, key: &str) -> Result<Option<String>>;

    fn set_option(&self, key: &str, value: &str) -> Result<()>;

    /// Returns whether the option existed
    fn delete_option(&self, key: &str) -> Result<bool>;

    /// `None` for missing or expired entries
    fn get_transient(&self, key: &str) -> Result<Option<String>>;

    fn set_transient(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Returns whether the transient existed
    fn delete_transient(&self, key: &str) -> Result<bool>;
}

/// Per-plugin storage keys, namespaced by the derived prefix
#[derive(Clone, Debug)]
pub struct StoreKeys {
    prefix: String,
}

impl StoreKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn license_key(&self) -> String {
        format!("{}_license_key", self.prefix)
    }

    pub fn license_status(&self) -> String {
        format!("{}_license_status", self.prefix)
    }

    pub fn license_validity(&self) -> String {
        format!("{}_license_validity", self.prefix)
    }

    pub fn license_data(&self) -> String {
        format!("{}_license_data", self.prefix)
    }

    pub fn enable_beta(&self) -> String {
        format!("{}_enable_beta", self.prefix)
    }
}

/// In-memory store (for tests and development)
#[derive(Default)]
pub struct MemoryStore {
    options: Mutex<HashMap<String, String>>,
    transients: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_option(&self, key: &str) -> Result<Option<String>> {
        Ok(self.options.lock().unwrap().get(key).cloned())
    }

    fn set_option(&self, key: &str, value: &str) -> Result<()> {
        self.options
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_option(&self, key: &str) -> Result<bool> {
        Ok(self.options.lock().unwrap().remove(key).is_some())
    }

    fn get_transient(&self, key: &str) -> Result<Option<String>> {
        let mut transients = self.transients.lock().unwrap();
        match transients.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                transients.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set_transient(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.transients
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    fn delete_transient(&self, key: &str) -> Result<bool> {
        Ok(self.transients.lock().unwrap().remove(key).is_some())
    }
}
