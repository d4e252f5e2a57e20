//! Beta-channel opt-in flag

use std::sync::Arc;

use crate::l10n::{L10n, fill};
use crate::notice::NoticeLog;
use crate::request::RequestContext;
use crate::store::{SettingsStore, StoreKeys};

/// Per-plugin beta opt-in, persisted as a durable option
pub struct BetaOptIn {
    prefix: String,
    keys: StoreKeys,
    plugin_name: String,
    store: Arc<dyn SettingsStore>,
    l10n: Arc<L10n>,
    notices: Arc<NoticeLog>,
}

impl BetaOptIn {
    pub(crate) fn new(
        prefix: &str,
        plugin_name: &str,
        store: Arc<dyn SettingsStore>,
        l10n: Arc<L10n>,
        notices: Arc<NoticeLog>,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            keys: StoreKeys::new(prefix),
            plugin_name: plugin_name.to_string(),
            store,
            l10n,
            notices,
        }
    }

    pub fn enabled(&self) -> bool {
        self.store
            .get_option(&self.keys.enable_beta())
            .ok()
            .flatten()
            .is_some_and(|v| v == "1")
    }

    /// Persist the opt-in. Requires the host-verified `<prefix>_beta`
    /// nonce; silently returns otherwise.
    pub fn save(&self, ctx: &RequestContext) {
        if !ctx.nonce_verified(&self.nonce_action()) {
            return;
        }

        let _ = self.store.set_option(&self.keys.enable_beta(), "1");
        self.notices.success(fill(
            &self.l10n.text("beta_checkbox.enabled"),
            &[("plugin", &self.plugin_name)],
        ));
        tracing::info!(plugin = %self.plugin_name, "Beta releases enabled");
    }

    /// Clear the opt-in, same nonce gate as [`save`](Self::save)
    pub fn delete(&self, ctx: &RequestContext) {
        if !ctx.nonce_verified(&self.nonce_action()) {
            return;
        }

        let _ = self.store.delete_option(&self.keys.enable_beta());
        self.notices.success(fill(
            &self.l10n.text("beta_checkbox.disabled"),
            &[("plugin", &self.plugin_name)],
        ));
        tracing::info!(plugin = %self.plugin_name, "Beta releases disabled");
    }

    fn nonce_action(&self) -> String {
        format!("{}_beta", self.prefix)
    }
}
