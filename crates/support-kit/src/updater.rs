//! Update Checker Adapter
//!
//! Wraps the store's update feed with the host plugin's metadata and
//! license key so releases (and, when opted in, beta releases) flow
//! through automatic updates. Also produces the "please register" nag
//! shown on the plugins screen while the license is not valid.

use std::sync::Arc;

use edd_client::{ItemRef, StoreApi, UpdateParams, VersionInfo};
use semver::Version;

use crate::config::PluginMetadata;
use crate::error::Result;
use crate::l10n::{L10n, fill};

/// Version of the bundled update feed handler
pub const UPDATER_VERSION: &str = "1.9.2";

/// First feed handler version with beta-channel support. The beta
/// checkbox is suppressed entirely below this.
pub const MIN_BETA_UPDATER_VERSION: &str = "1.6.9";

/// A newer release advertised by the update feed
#[derive(Clone, Debug)]
pub struct UpdateAvailable {
    pub version: String,
    pub download_link: Option<String>,
    pub url: Option<String>,
}

/// Per-plugin update feed wiring
pub struct UpdateChecker {
    metadata: PluginMetadata,
    item: ItemRef,
    site_url: String,
    api: Arc<dyn StoreApi>,
    l10n: Arc<L10n>,
    nag_message: Option<String>,
    license_uri: Option<String>,
}

impl UpdateChecker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        metadata: PluginMetadata,
        item: ItemRef,
        site_url: &str,
        api: Arc<dyn StoreApi>,
        l10n: Arc<L10n>,
        nag_message: Option<String>,
        license_uri: Option<String>,
    ) -> Self {
        Self {
            metadata,
            item,
            site_url: site_url.to_string(),
            api,
            l10n,
            nag_message,
            license_uri,
        }
    }

    /// API parameter set handed to the update feed
    pub fn update_params(&self, license_key: &str, beta: bool) -> UpdateParams {
        UpdateParams {
            item: self.item.clone(),
            version: self.metadata.version.clone(),
            license: license_key.to_string(),
            author: self.metadata.author.clone(),
            beta,
            url: self.site_url.clone(),
        }
    }

    /// Ask the feed for the latest release and compare against the
    /// installed version.
    pub async fn check_update(
        &self,
        license_key: &str,
        beta: bool,
    ) -> Result<Option<UpdateAvailable>> {
        let params = self.update_params(license_key, beta);
        let info: VersionInfo = self.api.version_request(&params).await?;

        let Some(new_version) = info.new_version.clone() else {
            return Ok(None);
        };

        if is_newer(&new_version, &self.metadata.version) {
            tracing::info!(
                plugin = %self.metadata.name,
                installed = %self.metadata.version,
                available = %new_version,
                "Update available"
            );
            Ok(Some(UpdateAvailable {
                version: new_version,
                download_link: info.download_link,
                url: info.url,
            }))
        } else {
            Ok(None)
        }
    }

    /// Whether the bundled feed handler supports the beta channel
    pub fn supports_beta(&self) -> bool {
        match (parse_version(UPDATER_VERSION), parse_version(MIN_BETA_UPDATER_VERSION)) {
            (Some(bundled), Some(minimum)) => bundled >= minimum,
            _ => false,
        }
    }

    /// Nag text shown in the plugin row while the license is not valid.
    ///
    /// The purchase link is appended only when the plugin declares a URI
    /// and no key has been entered at all; the activation link whenever
    /// the host told us where its licensing page lives.
    pub fn nag_text(&self, license_key: &str) -> String {
        let mut message = match &self.nag_message {
            Some(custom) => custom.clone(),
            None => fill(
                &self.l10n.text("nag.register"),
                &[("plugin", self.metadata.name.as_str())],
            ),
        };

        if license_key.is_empty() {
            if let Some(uri) = &self.metadata.plugin_uri {
                message.push(' ');
                message.push_str(&fill(
                    &self.l10n.text("nag.purchase"),
                    &[("plugin_uri", uri.as_str())],
                ));
            }
        }

        if let Some(uri) = &self.license_uri {
            message.push(' ');
            message.push_str(&fill(
                &self.l10n.text("nag.activate"),
                &[("license_uri", uri.as_str())],
            ));
        }

        message
    }
}

/// Lenient semver parse: two-component versions like `1.2` get a zero
/// patch component appended.
fn parse_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    Version::parse(raw)
        .or_else(|_| Version::parse(&format!("{raw}.0")))
        .ok()
}

fn is_newer(candidate: &str, installed: &str) -> bool {
    match (parse_version(candidate), parse_version(installed)) {
        (Some(candidate), Some(installed)) => candidate > installed,
        // Fall back to inequality when the feed sends something exotic
        _ => candidate != installed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edd_client::MockStoreApi;

    fn metadata() -> PluginMetadata {
        PluginMetadata {
            name: "Example Plugin".into(),
            version: "2.1.0".into(),
            author: "Vendor".into(),
            text_domain: "example-plugin".into(),
            plugin_uri: Some("https://example.com/plugin".into()),
        }
    }

    fn checker(api: Arc<MockStoreApi>) -> UpdateChecker {
        UpdateChecker::new(
            metadata(),
            ItemRef::Name("Example Plugin".into()),
            "https://customer-site.example.com",
            api,
            Arc::new(L10n::new(None)),
            None,
            None,
        )
    }

    #[test]
    fn test_update_params_carry_license_and_beta() {
        let checker = checker(Arc::new(MockStoreApi::new()));
        let params = checker.update_params("KEY-123", true);

        assert_eq!(params.version, "2.1.0");
        assert_eq!(params.license, "KEY-123");
        assert_eq!(params.author, "Vendor");
        assert!(params.beta);
    }

    #[tokio::test]
    async fn test_check_update_reports_newer_release_only() {
        let api = Arc::new(MockStoreApi::new());
        api.set_version_info(VersionInfo {
            new_version: Some("2.2.0".into()),
            download_link: Some("https://store.example.com/dl".into()),
            ..Default::default()
        });

        let update = checker(api.clone()).check_update("KEY-123", false).await.unwrap();
        let update = update.unwrap();
        assert_eq!(update.version, "2.2.0");
        assert_eq!(update.download_link.as_deref(), Some("https://store.example.com/dl"));

        api.set_version_info(VersionInfo {
            new_version: Some("2.1.0".into()),
            ..Default::default()
        });
        assert!(checker(api).check_update("KEY-123", false).await.unwrap().is_none());
    }

    #[test]
    fn test_version_compare_handles_two_component_versions() {
        assert!(is_newer("1.3", "1.2.9"));
        assert!(!is_newer("1.2.0", "1.2"));
        assert!(is_newer("2.0.0", "1.9.9"));
    }

    #[test]
    fn test_beta_gate_uses_bundled_updater_version() {
        let checker = checker(Arc::new(MockStoreApi::new()));
        assert!(checker.supports_beta());
        assert!(parse_version(MIN_BETA_UPDATER_VERSION).unwrap()
            <= parse_version(UPDATER_VERSION).unwrap());
    }

    #[test]
    fn test_nag_purchase_link_only_without_key() {
        let checker = checker(Arc::new(MockStoreApi::new()));

        let without_key = checker.nag_text("");
        assert!(without_key.contains("Register your copy of Example Plugin"));
        assert!(without_key.contains("https://example.com/plugin"));

        let with_key = checker.nag_text("KEY-123");
        assert!(!with_key.contains("purchase"));
    }

    #[test]
    fn test_nag_message_override() {
        let api: Arc<MockStoreApi> = Arc::new(MockStoreApi::new());
        let checker = UpdateChecker::new(
            metadata(),
            ItemRef::Name("Example Plugin".into()),
            "https://customer-site.example.com",
            api,
            Arc::new(L10n::new(None)),
            Some("Head to Settings → License to register.".into()),
            None,
        );

        assert!(checker.nag_text("KEY-123").starts_with("Head to Settings"));
    }

    #[test]
    fn test_nag_no_uri_means_no_purchase_link() {
        let mut meta = metadata();
        meta.plugin_uri = None;
        let checker = UpdateChecker::new(
            meta,
            ItemRef::Name("Example Plugin".into()),
            "https://customer-site.example.com",
            Arc::new(MockStoreApi::new()),
            Arc::new(L10n::new(None)),
            None,
            None,
        );

        assert!(!checker.nag_text("").contains("purchase"));
    }

    #[test]
    fn test_nag_links_licensing_page_when_known() {
        let checker = UpdateChecker::new(
            metadata(),
            ItemRef::Name("Example Plugin".into()),
            "https://customer-site.example.com",
            Arc::new(MockStoreApi::new()),
            Arc::new(L10n::new(None)),
            None,
            Some("https://customer-site.example.com/wp-admin/admin.php?page=example".into()),
        );

        // The activation link shows with or without an entered key
        let with_key = checker.nag_text("KEY-123");
        assert!(with_key.contains("admin.php?page=example"));
        assert!(with_key.contains("activate it"));

        let without_key = checker.nag_text("");
        assert!(without_key.contains("purchase one"));
        assert!(without_key.contains("activate it"));

        // And never without a configured licensing page
        let bare = self::checker(Arc::new(MockStoreApi::new()));
        assert!(!bare.nag_text("").contains("activate it"));
    }
}
