//! Top-level toolkit object
//!
//! One [`Support`] per host plugin, composing the license manager,
//! update checker, beta opt-in, email flow, template renderer and debug
//! report behind a single request dispatcher. The host builds a
//! [`RequestContext`] per admin request and calls
//! [`handle_request`](Support::handle_request) during its init phase;
//! rendering methods are invoked explicitly from its settings page.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use edd_client::StoreApi;

use crate::beta::BetaOptIn;
use crate::config::{SupportConfig, derive_prefix};
use crate::email::{Mailer, SupportEmail};
use crate::error::Result;
use crate::l10n::{L10n, fill};
use crate::license::{LicenseManager, VALID};
use crate::notice::{Notice, NoticeLog};
use crate::report::{DebugReport, ReportHooks, SiteInventory};
use crate::request::{LicenseAction, RequestContext};
use crate::template::TemplateEngine;
use crate::updater::UpdateChecker;

pub struct Support {
    config: SupportConfig,
    prefix: String,
    notices: Arc<NoticeLog>,
    license: Arc<LicenseManager>,
    updater: UpdateChecker,
    beta: BetaOptIn,
    email: SupportEmail,
    templates: TemplateEngine,
    report: DebugReport,
    l10n: Arc<L10n>,
}

impl Support {
    /// Wire up the toolkit for one host plugin. Fails when the
    /// configuration is missing a required field.
    pub fn new(
        config: SupportConfig,
        store: Arc<dyn crate::store::SettingsStore>,
        api: Arc<dyn StoreApi>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        config.validate()?;

        let prefix = derive_prefix(&config.metadata.text_domain);
        let l10n = Arc::new(L10n::new(config.l10n_overrides.as_ref()));
        let notices = Arc::new(NoticeLog::new(&prefix));

        let license = Arc::new(LicenseManager::new(
            &prefix,
            &config.metadata.name,
            config.item(),
            &config.site_url,
            &config.store_url,
            store.clone(),
            api.clone(),
            l10n.clone(),
            notices.clone(),
        ));

        let updater = UpdateChecker::new(
            config.metadata.clone(),
            config.item(),
            &config.site_url,
            api,
            l10n.clone(),
            config.nag_message.clone(),
            config.license_uri.clone(),
        );

        let beta = BetaOptIn::new(
            &prefix,
            &config.metadata.name,
            store,
            l10n.clone(),
            notices.clone(),
        );

        let email = SupportEmail::new(
            &prefix,
            config.metadata.clone(),
            &config.support_address,
            config.message_prefix.clone(),
            l10n.clone(),
            notices.clone(),
            mailer,
            license.clone(),
        );

        let plugin_dir = config
            .plugin_file
            .parent()
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let templates = TemplateEngine::new(&plugin_dir);
        let report = DebugReport::new(plugin_dir);

        tracing::debug!(plugin = %config.metadata.name, %prefix, "Support toolkit wired");

        Ok(Self {
            config,
            prefix,
            notices,
            license,
            updater,
            beta,
            email,
            templates,
            report,
            l10n,
        })
    }

    /// Dispatch every action the request carries, then refresh the
    /// validity cache so stale-license notices surface once per request.
    ///
    /// The combined delete-and-deactivate action releases the site
    /// activation first, while the stored key is still available for the
    /// API call, then clears everything.
    pub async fn handle_request(&self, ctx: &RequestContext, inventory: &SiteInventory) {
        let action = ctx.license_action(&self.prefix);

        match action {
            Some(LicenseAction::Activate | LicenseAction::Save) => {
                self.license.activate(ctx).await;
            }
            Some(LicenseAction::Deactivate) => self.license.deactivate(ctx).await,
            Some(LicenseAction::Delete) => self.license.delete(ctx),
            Some(LicenseAction::DeleteDeactivate) => {
                self.license.deactivate(ctx).await;
                self.license.delete(ctx);
            }
            None => {}
        }

        if ctx.support_submitted(&self.prefix) {
            self.email.send(ctx, &self.report, inventory).await;
        }

        if ctx.nonce_verified(&format!("{}_beta", self.prefix)) {
            if ctx.beta_enabled_param(&self.prefix) {
                self.beta.save(ctx);
            } else {
                self.beta.delete(ctx);
            }
        }

        if !action.is_some_and(LicenseAction::deletes) {
            self.license.license_validity(ctx).await;
        }
    }

    /// Render the sidebar support widget: the form when the license is
    /// valid, the disabled notice otherwise.
    ///
    /// `nonce_field` is the host-rendered hidden nonce markup for the
    /// `<prefix>_support` action.
    pub async fn support_form(&self, ctx: &RequestContext, nonce_field: &str) -> Result<String> {
        let title = fill(
            &self.l10n.text("support_form.title"),
            &[("plugin", &self.config.metadata.name)],
        );

        if self.license.license_status(ctx).await == VALID {
            self.templates.render(
                "sidebar-support",
                &vars([
                    ("prefix", self.prefix.clone()),
                    ("title", title),
                    ("nonce_field", nonce_field.to_string()),
                    ("subject_placeholder", self.l10n.text("support_form.subject_placeholder")),
                    ("message_placeholder", self.l10n.text("support_form.message_placeholder")),
                    ("send_label", self.l10n.text("support_form.send")),
                ]),
            )
        } else {
            self.templates.render(
                "sidebar-support-disabled",
                &vars([
                    ("prefix", self.prefix.clone()),
                    ("title", title),
                    ("disabled_text", self.l10n.text("support_form.disabled")),
                ]),
            )
        }
    }

    /// Render the license key input with the buttons matching the current
    /// key and validity state.
    pub async fn licensing_fields(&self, ctx: &RequestContext, nonce_field: &str) -> Result<String> {
        let key = self.license.license_key(ctx);
        let validity = self.license.license_validity(ctx).await;
        let valid = validity == VALID;
        let t = |path: &str| self.l10n.text(&format!("licensing_fields.{path}"));

        let (buttons, status) = if key.is_empty() {
            let save = button(&self.prefix, "save", "button button-primary", &t("save_activate"));
            (save, String::new())
        } else {
            let toggle = if valid {
                button(&self.prefix, "deactivate", "button", &t("deactivate"))
            } else {
                button(&self.prefix, "activate", "button button-primary", &t("activate"))
            };
            let delete = if valid {
                button(&self.prefix, "delete_deactivate", "button", &t("delete_deactivate"))
            } else {
                button(&self.prefix, "delete", "button", &t("delete"))
            };
            let status = format!(
                "<p class=\"license-status {}\"><span>{}</span></p>",
                if valid { "active" } else { "inactive" },
                if valid { t("active") } else { t("inactive") },
            );
            (format!("{toggle}\n\t{delete}"), status)
        };

        self.templates.render(
            "licensing-fields",
            &vars([
                ("prefix", self.prefix.clone()),
                ("nonce_field", nonce_field.to_string()),
                ("label", fill(&t("label"), &[("plugin", &self.config.metadata.name)])),
                ("license_key", key.clone()),
                ("key_disabled", if key.is_empty() { String::new() } else { " disabled".to_string() }),
                ("inactive_class", if valid { String::new() } else { " licensing-inactive".to_string() }),
                ("buttons", buttons),
                ("status", status),
            ]),
        )
    }

    /// Render the beta opt-in checkbox. Empty when the license is not
    /// valid or the bundled update feed handler predates beta support.
    pub async fn beta_checkbox(&self, ctx: &RequestContext, nonce_field: &str) -> Result<String> {
        if self.license.license_status(ctx).await != VALID || !self.updater.supports_beta() {
            return Ok(String::new());
        }

        self.templates.render(
            "beta-checkbox",
            &vars([
                ("prefix", self.prefix.clone()),
                ("nonce_field", nonce_field.to_string()),
                ("checked", if self.beta.enabled() { " checked".to_string() } else { String::new() }),
                (
                    "label",
                    fill(
                        &self.l10n.text("beta_checkbox.label"),
                        &[("plugin", &self.config.metadata.name)],
                    ),
                ),
            ]),
        )
    }

    /// Render the plugin-row register nag, or `None` while the license
    /// is valid.
    pub async fn license_nag(&self, ctx: &RequestContext) -> Result<Option<String>> {
        if self.license.license_validity(ctx).await == VALID {
            return Ok(None);
        }

        let key = self.license.license_key(ctx);
        let html = self.templates.render(
            "license-nag",
            &vars([
                ("prefix", self.prefix.clone()),
                ("message", self.updater.nag_text(&key)),
            ]),
        )?;
        Ok(Some(html))
    }

    /// Drain the notices accumulated while handling the request
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn license(&self) -> &LicenseManager {
        &self.license
    }

    pub fn updater(&self) -> &UpdateChecker {
        &self.updater
    }

    pub fn beta(&self) -> &BetaOptIn {
        &self.beta
    }

    /// Extension points for host-specific debug report sections
    pub fn report_hooks_mut(&mut self) -> &mut ReportHooks {
        self.report.hooks_mut()
    }

    pub fn debug_report(&self, inventory: &SiteInventory) -> String {
        self.report.render(inventory)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

fn vars<const N: usize>(pairs: [(&'static str, String); N]) -> HashMap<&'static str, String> {
    pairs.into_iter().collect()
}

fn button(prefix: &str, value: &str, class: &str, label: &str) -> String {
    format!(
        "<button name=\"{prefix}_license_action\" value=\"{value}\" class=\"{class}\" \
         id=\"{prefix}_license_{value}\">{label}</button>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginMetadata;
    use crate::email::MockMailer;
    use crate::notice::NoticeKind;
    use crate::store::{MemoryStore, SettingsStore};
    use edd_client::{LicenseResponse, MockStoreApi};

    struct Fixture {
        support: Support,
        store: Arc<MemoryStore>,
        api: Arc<MockStoreApi>,
        mailer: Arc<MockMailer>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let api = Arc::new(MockStoreApi::new());
        let mailer = Arc::new(MockMailer::new());
        let config = SupportConfig::new(
            "/srv/plugins/example-plugin/example-plugin.php",
            PluginMetadata {
                name: "Example Plugin".into(),
                version: "2.1.0".into(),
                author: "Vendor".into(),
                text_domain: "example-plugin".into(),
                plugin_uri: Some("https://example.com/plugin".into()),
            },
            "https://store.example.com",
            "https://customer-site.example.com",
            "support@example.com",
        );
        let support =
            Support::new(config, store.clone(), api.clone(), mailer.clone()).unwrap();
        Fixture {
            support,
            store,
            api,
            mailer,
        }
    }

    fn valid_response() -> LicenseResponse {
        LicenseResponse {
            success: true,
            license: Some("valid".into()),
            customer_name: Some("Ada Lovelace".into()),
            customer_email: Some("ada@example.com".into()),
            ..Default::default()
        }
    }

    fn activate_ctx(key: &str) -> RequestContext {
        RequestContext::new()
            .with_param("example_plugin_license_action", "save")
            .with_param("example_plugin_license_key", key)
            .with_verified_nonce("example_plugin_license")
    }

    #[test]
    fn test_new_rejects_incomplete_config() {
        let config = SupportConfig::new(
            "/srv/plugins/x/x.php",
            PluginMetadata {
                name: String::new(),
                version: "1.0".into(),
                author: "Vendor".into(),
                text_domain: "x".into(),
                plugin_uri: None,
            },
            "https://store.example.com",
            "https://site.example.com",
            "support@example.com",
        );

        let result = Support::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MockStoreApi::new()),
            Arc::new(MockMailer::new()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_activate_through_dispatch_persists_key_and_status() {
        let f = fixture();
        f.api.push_response(valid_response());

        f.support
            .handle_request(&activate_ctx("KEY-123"), &SiteInventory::default())
            .await;

        assert_eq!(
            f.store.get_option("example_plugin_license_key").unwrap(),
            Some("KEY-123".to_string())
        );
        assert_eq!(
            f.store.get_option("example_plugin_license_status").unwrap(),
            Some("valid".to_string())
        );

        let notices = f.support.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[0].message, "Example Plugin license successfully activated.");
    }

    #[tokio::test]
    async fn test_delete_deactivate_releases_activation_then_clears_everything() {
        let f = fixture();
        f.api.push_response(valid_response());
        f.support
            .handle_request(&activate_ctx("KEY-123"), &SiteInventory::default())
            .await;
        f.support.notices();

        f.api.push_response(LicenseResponse {
            success: true,
            license: Some("deactivated".into()),
            ..Default::default()
        });
        let ctx = RequestContext::new()
            .with_param("example_plugin_license_action", "delete_deactivate")
            .with_verified_nonce("example_plugin_license");
        f.support.handle_request(&ctx, &SiteInventory::default()).await;

        // Activation call plus one deactivation call, nothing more
        assert_eq!(f.api.call_count(), 2);
        assert_eq!(f.store.get_option("example_plugin_license_key").unwrap(), None);
        assert_eq!(f.store.get_option("example_plugin_license_status").unwrap(), None);
        assert_eq!(f.store.get_transient("example_plugin_license_validity").unwrap(), None);
        assert_eq!(f.store.get_transient("example_plugin_license_data").unwrap(), None);

        // The deactivation notice only; the delete notice is suppressed
        let notices = f.support.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Example Plugin license successfully deactivated.");
    }

    #[tokio::test]
    async fn test_plain_delete_short_circuits_validity_refresh() {
        let f = fixture();
        f.store.set_option("example_plugin_license_key", "KEY-123").unwrap();

        let ctx = RequestContext::new()
            .with_param("example_plugin_license_action", "delete")
            .with_verified_nonce("example_plugin_license");
        f.support.handle_request(&ctx, &SiteInventory::default()).await;

        assert_eq!(f.api.call_count(), 0);
        assert_eq!(f.support.license().license_key(&ctx), "");

        let notices = f.support.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Example Plugin license successfully deleted.");
    }

    #[tokio::test]
    async fn test_support_form_swaps_on_license_status() {
        let f = fixture();

        // No key at all renders the disabled widget
        let disabled = f
            .support
            .support_form(&RequestContext::new(), "<!-- nonce -->")
            .await
            .unwrap();
        assert!(disabled.contains("support-disabled"));
        assert!(disabled.contains("Need some help with Example Plugin?"));

        f.api.push_response(valid_response());
        f.support
            .handle_request(&activate_ctx("KEY-123"), &SiteInventory::default())
            .await;
        f.support.notices();

        let enabled = f
            .support
            .support_form(&RequestContext::new(), "<!-- nonce -->")
            .await
            .unwrap();
        assert!(enabled.contains("support_subject"));
        assert!(enabled.contains("example_plugin_support_submit"));
        assert!(enabled.contains("<!-- nonce -->"));
    }

    #[tokio::test]
    async fn test_licensing_fields_without_key() {
        let f = fixture();

        // No key: a single save-and-activate button, no status line
        let empty = f
            .support
            .licensing_fields(&RequestContext::new(), "")
            .await
            .unwrap();
        assert!(empty.contains("value=\"save\""));
        assert!(empty.contains("Save and Activate"));
        assert!(!empty.contains("license-status"));
        assert!(empty.contains("licensing-inactive"));
    }

    #[tokio::test]
    async fn test_licensing_fields_with_active_license() {
        let f = fixture();
        f.api.push_response(valid_response());
        f.support
            .handle_request(&activate_ctx("KEY-123"), &SiteInventory::default())
            .await;
        f.support.notices();

        let active = f
            .support
            .licensing_fields(&RequestContext::new(), "")
            .await
            .unwrap();
        assert!(active.contains("value=\"KEY-123\""));
        assert!(active.contains(" disabled"));
        assert!(active.contains("value=\"deactivate\""));
        assert!(active.contains("value=\"delete_deactivate\""));
        assert!(active.contains("License Active"));
        assert!(!active.contains("licensing-inactive"));
    }

    #[tokio::test]
    async fn test_beta_checkbox_requires_valid_license() {
        let f = fixture();

        assert_eq!(
            f.support.beta_checkbox(&RequestContext::new(), "").await.unwrap(),
            ""
        );

        f.api.push_response(valid_response());
        f.support
            .handle_request(&activate_ctx("KEY-123"), &SiteInventory::default())
            .await;
        f.support.notices();

        let html = f.support.beta_checkbox(&RequestContext::new(), "").await.unwrap();
        assert!(html.contains("example_plugin_enable_beta"));
        assert!(!html.contains(" checked"));
    }

    #[tokio::test]
    async fn test_beta_toggle_through_dispatch() {
        let f = fixture();

        let ctx = RequestContext::new()
            .with_param("example_plugin_enable_beta", "1")
            .with_verified_nonce("example_plugin_beta");
        f.support.handle_request(&ctx, &SiteInventory::default()).await;
        assert!(f.support.beta().enabled());

        let ctx = RequestContext::new().with_verified_nonce("example_plugin_beta");
        f.support.handle_request(&ctx, &SiteInventory::default()).await;
        assert!(!f.support.beta().enabled());
    }

    #[tokio::test]
    async fn test_license_nag_only_while_invalid() {
        let f = fixture();

        let nag = f.support.license_nag(&RequestContext::new()).await.unwrap();
        let nag = nag.unwrap();
        assert!(nag.contains("Register your copy of Example Plugin"));
        assert!(nag.contains("https://example.com/plugin"));

        let f = fixture();
        f.api.push_response(valid_response());
        f.support
            .handle_request(&activate_ctx("KEY-123"), &SiteInventory::default())
            .await;
        f.support.notices();

        assert!(f.support.license_nag(&RequestContext::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_license_nag_links_configured_licensing_page() {
        let config = SupportConfig::new(
            "/srv/plugins/example-plugin/example-plugin.php",
            PluginMetadata {
                name: "Example Plugin".into(),
                version: "2.1.0".into(),
                author: "Vendor".into(),
                text_domain: "example-plugin".into(),
                plugin_uri: Some("https://example.com/plugin".into()),
            },
            "https://store.example.com",
            "https://customer-site.example.com",
            "support@example.com",
        )
        .with_license_uri("https://customer-site.example.com/wp-admin/admin.php?page=example");

        let support = Support::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MockStoreApi::new()),
            Arc::new(MockMailer::new()),
        )
        .unwrap();

        let nag = support.license_nag(&RequestContext::new()).await.unwrap();
        let nag = nag.unwrap();
        assert!(nag.contains("admin.php?page=example"));
        assert!(nag.contains("activate it"));
    }

    #[tokio::test]
    async fn test_support_submission_sends_mail_through_dispatch() {
        let f = fixture();
        f.api.push_response(valid_response());
        f.support
            .handle_request(&activate_ctx("KEY-123"), &SiteInventory::default())
            .await;
        f.support.notices();

        let ctx = RequestContext::new()
            .with_param("example_plugin_support_submit", "1")
            .with_param("support_subject", "Help")
            .with_param("support_message", "Something broke.")
            .with_verified_nonce("example_plugin_support")
            .with_manage_capability(true);
        f.support.handle_request(&ctx, &SiteInventory::default()).await;

        let mails = f.mailer.sent();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].subject, "Help");
        assert_eq!(mails[0].from_email, "ada@example.com");
    }
}
