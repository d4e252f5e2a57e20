//! Host plugin configuration
//!
//! A host plugin hands the toolkit its declared metadata plus the store
//! coordinates. The per-plugin prefix is derived from the text domain and
//! namespaces every stored key, notice slug and extension hook, so two
//! plugins embedding this toolkit never collide as long as their text
//! domains differ.

use std::path::PathBuf;

use edd_client::ItemRef;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SupportError};

/// Metadata a plugin declares in its own file header
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Display name, also the store's `item_name`
    pub name: String,

    /// Installed version
    pub version: String,

    pub author: String,

    /// Translation text domain; the prefix is derived from this
    pub text_domain: String,

    /// Product page URL, used for the purchase link in the license nag
    #[serde(default)]
    pub plugin_uri: Option<String>,
}

/// Construction-time configuration for [`crate::Support`]
#[derive(Clone, Debug)]
pub struct SupportConfig {
    /// Path to the host plugin's main file. Template overrides are looked
    /// up relative to its directory.
    pub plugin_file: PathBuf,

    pub metadata: PluginMetadata,

    /// Root URL of the vendor's licensing store
    pub store_url: String,

    /// URL of the site the license is bound to
    pub site_url: String,

    /// Where support requests are mailed
    pub support_address: String,

    /// Use the store's numeric download ID instead of the item name for
    /// every API call
    pub item_id: Option<u32>,

    /// Page where the host plugin renders its licensing fields, linked
    /// from the register nag when known
    pub license_uri: Option<String>,

    /// Overrides merged over the built-in localization defaults
    pub l10n_overrides: Option<serde_json::Value>,

    /// Replaces the default register nag text
    pub nag_message: Option<String>,

    /// Prepended to every support email body instead of the default
    /// version/plugin header block
    pub message_prefix: Option<String>,
}

impl SupportConfig {
    pub fn new(
        plugin_file: impl Into<PathBuf>,
        metadata: PluginMetadata,
        store_url: impl Into<String>,
        site_url: impl Into<String>,
        support_address: impl Into<String>,
    ) -> Self {
        Self {
            plugin_file: plugin_file.into(),
            metadata,
            store_url: store_url.into(),
            site_url: site_url.into(),
            support_address: support_address.into(),
            item_id: None,
            license_uri: None,
            l10n_overrides: None,
            nag_message: None,
            message_prefix: None,
        }
    }

    pub fn with_item_id(mut self, item_id: u32) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn with_license_uri(mut self, uri: impl Into<String>) -> Self {
        self.license_uri = Some(uri.into());
        self
    }

    pub fn with_l10n_overrides(mut self, overrides: serde_json::Value) -> Self {
        self.l10n_overrides = Some(overrides);
        self
    }

    pub fn with_nag_message(mut self, message: impl Into<String>) -> Self {
        self.nag_message = Some(message.into());
        self
    }

    pub fn with_message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = Some(prefix.into());
        self
    }

    /// Item reference for store calls; the numeric ID wins when set
    pub fn item(&self) -> ItemRef {
        match self.item_id {
            Some(id) => ItemRef::Id(id),
            None => ItemRef::Name(self.metadata.name.clone()),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.plugin_file.as_os_str().is_empty() {
            return Err(SupportError::Config("plugin file path is required".into()));
        }
        for (field, value) in [
            ("plugin name", &self.metadata.name),
            ("plugin version", &self.metadata.version),
            ("text domain", &self.metadata.text_domain),
            ("store URL", &self.store_url),
            ("site URL", &self.site_url),
            ("support address", &self.support_address),
        ] {
            if value.trim().is_empty() {
                return Err(SupportError::Config(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

/// Derive the per-plugin prefix from a text domain: lowercased, trimmed,
/// dashes folded to underscores.
pub fn derive_prefix(text_domain: &str) -> String {
    text_domain.trim().to_lowercase().replace('-', "_")
}
