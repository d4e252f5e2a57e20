//! License Key Manager
//!
//! Resolves, persists, activates, deactivates and deletes a license key
//! and its cached validity/status/raw data against the remote store.
//!
//! Three related values with different lifetimes:
//!
//! - the **key** and **status** are durable options,
//! - **validity** and raw license **data** are transients with a shared
//!   one day TTL, refreshed on demand (or forced via the
//!   `force-check-license` query flag) and invalidated together.

use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, NaiveDateTime};
use edd_client::{EddAction, ItemRef, LicenseRequest, LicenseResponse, StoreApi};

use crate::l10n::{L10n, fill};
use crate::notice::NoticeLog;
use crate::request::RequestContext;
use crate::store::{DAY, SettingsStore, StoreKeys};

pub const VALID: &str = "valid";
pub const INVALID: &str = "invalid";

/// Manages one plugin's license lifecycle
pub struct LicenseManager {
    prefix: String,
    keys: StoreKeys,
    plugin_name: String,
    item: ItemRef,
    site_url: String,
    store_url: String,
    store: Arc<dyn SettingsStore>,
    api: Arc<dyn StoreApi>,
    l10n: Arc<L10n>,
    notices: Arc<NoticeLog>,
    // Per-request memoization, mirroring the durable/transient values
    key_cache: RwLock<Option<String>>,
    status_cache: RwLock<Option<String>>,
    validity_cache: RwLock<Option<String>>,
    data_cache: RwLock<Option<LicenseResponse>>,
}

impl LicenseManager {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        prefix: &str,
        plugin_name: &str,
        item: ItemRef,
        site_url: &str,
        store_url: &str,
        store: Arc<dyn SettingsStore>,
        api: Arc<dyn StoreApi>,
        l10n: Arc<L10n>,
        notices: Arc<NoticeLog>,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            keys: StoreKeys::new(prefix),
            plugin_name: plugin_name.to_string(),
            item,
            site_url: site_url.to_string(),
            store_url: store_url.to_string(),
            store,
            api,
            l10n,
            notices,
            key_cache: RwLock::new(None),
            status_cache: RwLock::new(None),
            validity_cache: RwLock::new(None),
            data_cache: RwLock::new(None),
        }
    }

    /// The license key: request param first, stored option second, always
    /// trimmed. Empty string when unset.
    pub fn license_key(&self, ctx: &RequestContext) -> String {
        if let Some(key) = self.key_cache.read().unwrap().clone() {
            return key;
        }

        let key = match ctx.license_key_param(&self.prefix) {
            Some(param) => param.trim().to_string(),
            None => self
                .store
                .get_option(&self.keys.license_key())
                .ok()
                .flatten()
                .unwrap_or_default()
                .trim()
                .to_string(),
        };

        *self.key_cache.write().unwrap() = Some(key.clone());
        key
    }

    /// `valid` only when the stored status is `valid` AND the cached/live
    /// validity check agrees. A request param claiming validity is never
    /// trusted alone.
    pub async fn license_status(&self, ctx: &RequestContext) -> String {
        if let Some(status) = self.status_cache.read().unwrap().clone() {
            return status;
        }

        let stored = self
            .store
            .get_option(&self.keys.license_status())
            .ok()
            .flatten()
            .unwrap_or_default();

        let status = if stored.is_empty() {
            INVALID
        } else {
            let transient_valid = self
                .store
                .get_transient(&self.keys.license_validity())
                .ok()
                .flatten()
                .is_some_and(|v| v == VALID);

            if transient_valid || self.license_validity(ctx).await == VALID {
                VALID
            } else {
                INVALID
            }
        };

        *self.status_cache.write().unwrap() = Some(status.to_string());
        status.to_string()
    }

    /// The cached validity, refreshed from the store when the transient
    /// is missing or the `force-check-license` flag is set.
    ///
    /// A missing key short-circuits to `invalid` without a network call;
    /// a transport failure reports `invalid` without caching anything.
    pub async fn license_validity(&self, ctx: &RequestContext) -> String {
        if let Some(validity) = self.validity_cache.read().unwrap().clone() {
            return validity;
        }

        let key = self.license_key(ctx);
        if key.is_empty() {
            return INVALID.to_string();
        }

        if !ctx.force_check() {
            if let Ok(Some(validity)) = self.store.get_transient(&self.keys.license_validity()) {
                return validity;
            }
        }

        let request = self.license_request(EddAction::CheckLicense, &key);
        let data = match self.api.license_request(&request).await {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(%error, plugin = %self.plugin_name, "License check failed");
                return INVALID.to_string();
            }
        };

        self.cache_license_data(&data);

        if !data.is_valid() {
            let message = self.error_message(data.error_code(), &data);
            // A license action in flight has already raised its own notice
            if ctx.license_action(&self.prefix).is_none() {
                self.notices.error(message);
            }
        }

        let validity = data.license_or_invalid().to_string();
        let _ = self
            .store
            .set_transient(&self.keys.license_validity(), &validity, DAY);
        *self.validity_cache.write().unwrap() = Some(validity.clone());

        validity
    }

    /// Raw license data from the store, cached for a day. Used by the
    /// support email for the customer's on-file name and address.
    pub async fn license_data(&self, ctx: &RequestContext) -> Option<LicenseResponse> {
        if let Some(data) = self.data_cache.read().unwrap().clone() {
            return Some(data);
        }

        if let Ok(Some(json)) = self.store.get_transient(&self.keys.license_data()) {
            if let Ok(data) = serde_json::from_str::<LicenseResponse>(&json) {
                *self.data_cache.write().unwrap() = Some(data.clone());
                return Some(data);
            }
        }

        let key = self.license_key(ctx);
        if key.is_empty() {
            return None;
        }

        let request = self.license_request(EddAction::CheckLicense, &key);
        match self.api.license_request(&request).await {
            Ok(data) => {
                self.cache_license_data(&data);
                Some(data)
            }
            Err(error) => {
                tracing::warn!(%error, plugin = %self.plugin_name, "License data fetch failed");
                self.notices.error(self.no_connection_message());
                None
            }
        }
    }

    /// Activate the submitted key. Requires the host-verified
    /// `<prefix>_license` nonce; silently returns otherwise.
    ///
    /// The submitted key is persisted before the API call so a failed
    /// activation still leaves the key on the form.
    pub async fn activate(&self, ctx: &RequestContext) {
        if !ctx.nonce_verified(&self.nonce_action()) {
            return;
        }

        let key = self.license_key(ctx);
        let _ = self.store.set_option(&self.keys.license_key(), &key);

        let request = self.license_request(EddAction::ActivateLicense, &key);
        match self.api.license_request(&request).await {
            Err(error) => {
                tracing::warn!(%error, plugin = %self.plugin_name, "License activation failed");
                self.notices.error(self.no_connection_message());
            }
            Ok(data) if !data.success => {
                let message = self.error_message(data.error_code(), &data);
                self.notices.error(message);
            }
            Ok(data) => {
                self.notices.success(fill(
                    &self.l10n.text("license_activation"),
                    &[("plugin", &self.plugin_name)],
                ));

                let status = data.license_or_invalid().to_string();
                let _ = self.store.set_option(&self.keys.license_status(), &status);
                let _ = self
                    .store
                    .set_transient(&self.keys.license_validity(), VALID, DAY);
                self.cache_license_data(&data);

                *self.status_cache.write().unwrap() = None;
                *self.validity_cache.write().unwrap() = Some(VALID.to_string());

                tracing::info!(plugin = %self.plugin_name, %status, "License activated");
            }
        }
    }

    /// Release the site activation on the store. Requires the verified
    /// `<prefix>_license` nonce; never rewrites the stored key.
    ///
    /// On success, status, validity and cached data are cleared together.
    pub async fn deactivate(&self, ctx: &RequestContext) {
        if !ctx.nonce_verified(&self.nonce_action()) {
            return;
        }

        let key = self.license_key(ctx);
        let request = self.license_request(EddAction::DeactivateLicense, &key);

        match self.api.license_request(&request).await {
            Err(error) => {
                tracing::warn!(%error, plugin = %self.plugin_name, "License deactivation failed");
                self.notices.error(fill(
                    &self.l10n.text("license_deactivation.error"),
                    &[("plugin", &self.plugin_name)],
                ));
            }
            Ok(data) if !data.success => {
                self.notices.error(fill(
                    &self.l10n.text("license_deactivation.error"),
                    &[("plugin", &self.plugin_name)],
                ));
            }
            Ok(_) => {
                self.notices.success(fill(
                    &self.l10n.text("license_deactivation.success"),
                    &[("plugin", &self.plugin_name)],
                ));

                let _ = self.store.delete_option(&self.keys.license_status());
                let _ = self.store.delete_transient(&self.keys.license_validity());
                let _ = self.store.delete_transient(&self.keys.license_data());

                *self.status_cache.write().unwrap() = None;
                *self.validity_cache.write().unwrap() = None;
                *self.data_cache.write().unwrap() = None;

                tracing::info!(plugin = %self.plugin_name, "License deactivated");
            }
        }
    }

    /// Unconditionally remove the key, status and both cached artifacts.
    ///
    /// The success notice is suppressed when this runs as part of a
    /// combined delete-and-deactivate action, which raises its own.
    pub fn delete(&self, ctx: &RequestContext) {
        let _ = self.store.delete_option(&self.keys.license_key());
        let _ = self.store.delete_option(&self.keys.license_status());
        let _ = self.store.delete_transient(&self.keys.license_data());
        let _ = self.store.delete_transient(&self.keys.license_validity());

        *self.key_cache.write().unwrap() = Some(String::new());
        *self.status_cache.write().unwrap() = None;
        *self.validity_cache.write().unwrap() = None;
        *self.data_cache.write().unwrap() = None;

        tracing::info!(plugin = %self.plugin_name, "License deleted");

        if let Some(action) = ctx.license_action(&self.prefix) {
            if !action.deactivates() {
                self.notices.success(fill(
                    &self.l10n.text("license_deletion"),
                    &[("plugin", &self.plugin_name)],
                ));
            }
        }
    }

    /// Map a store error code to a localized, user-facing message.
    /// Pure: no side effects, no store access.
    pub fn error_message(&self, code: &str, data: &LicenseResponse) -> String {
        let l10n = &self.l10n;
        match code {
            "expired" => fill(
                &l10n.text("license_error_messages.expired"),
                &[
                    ("plugin", self.plugin_name.as_str()),
                    ("date", &format_expires(data.expires.as_deref())),
                ],
            ),
            "revoked" => l10n.text("license_error_messages.revoked"),
            "missing" | "invalid" => l10n.text("license_error_messages.missing"),
            "site_inactive" => l10n.text("license_error_messages.site_inactive"),
            "item_name_mismatch" => fill(
                &l10n.text("license_error_messages.item_name_mismatch"),
                &[("plugin", self.plugin_name.as_str())],
            ),
            "no_activations_left" => l10n.text("license_error_messages.no_activations_left"),
            _ => l10n.text("license_error_messages.default"),
        }
    }

    fn nonce_action(&self) -> String {
        format!("{}_license", self.prefix)
    }

    fn license_request(&self, action: EddAction, key: &str) -> LicenseRequest {
        LicenseRequest {
            action,
            license: key.to_string(),
            item: self.item.clone(),
            url: self.site_url.clone(),
        }
    }

    fn cache_license_data(&self, data: &LicenseResponse) {
        if let Ok(json) = serde_json::to_string(data) {
            let _ = self
                .store
                .set_transient(&self.keys.license_data(), &json, DAY);
        }
        *self.data_cache.write().unwrap() = Some(data.clone());
    }

    fn no_connection_message(&self) -> String {
        fill(
            &self.l10n.text("license_error_messages.no_connection"),
            &[
                ("plugin", self.plugin_name.as_str()),
                ("store_url", self.store_url.as_str()),
            ],
        )
    }
}

/// Render the store's expiry string as a human-readable date.
/// Unparseable values (e.g. `lifetime`) pass through untouched.
fn format_expires(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "unknown".to_string();
    };
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return datetime.format("%B %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%B %-d, %Y").to_string();
    }
    raw.to_string()
}
