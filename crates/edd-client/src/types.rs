//! Wire types for the EDD Software Licensing endpoint
//!
//! Every call is a GET against the store root with an `edd_action`
//! query parameter; responses are small JSON objects.

use serde::{Deserialize, Serialize};

/// The `edd_action` query value for a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EddAction {
    CheckLicense,
    ActivateLicense,
    DeactivateLicense,
    GetVersion,
}

impl EddAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EddAction::CheckLicense => "check_license",
            EddAction::ActivateLicense => "activate_license",
            EddAction::DeactivateLicense => "deactivate_license",
            EddAction::GetVersion => "get_version",
        }
    }
}

/// How the store identifies the product a license belongs to.
///
/// `item_name` and `item_id` are mutually exclusive on the wire; a store
/// configured with download IDs should use `Id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemRef {
    Name(String),
    Id(u32),
}

impl ItemRef {
    fn push_query(&self, pairs: &mut Vec<(String, String)>) {
        match self {
            ItemRef::Name(name) => pairs.push(("item_name".into(), name.clone())),
            ItemRef::Id(id) => pairs.push(("item_id".into(), id.to_string())),
        }
    }
}

/// Parameters for a license lifecycle request
#[derive(Clone, Debug)]
pub struct LicenseRequest {
    /// Which lifecycle action to perform
    pub action: EddAction,

    /// The customer-supplied license key
    pub license: String,

    /// Product identification
    pub item: ItemRef,

    /// The site the license is (de)activated for
    pub url: String,
}

impl LicenseRequest {
    /// Query pairs for the outgoing GET
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("edd_action".into(), self.action.as_str().into()),
            ("license".into(), self.license.clone()),
        ];
        self.item.push_query(&mut pairs);
        pairs.push(("url".into(), self.url.clone()));
        pairs
    }
}

/// Parameters for an update feed (`get_version`) request
#[derive(Clone, Debug)]
pub struct UpdateParams {
    pub item: ItemRef,

    /// Installed version of the plugin
    pub version: String,

    pub license: String,

    pub author: String,

    /// Opt in to beta-channel releases
    pub beta: bool,

    pub url: String,
}

impl UpdateParams {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "edd_action".into(),
            EddAction::GetVersion.as_str().into(),
        )];
        self.item.push_query(&mut pairs);
        pairs.push(("version".into(), self.version.clone()));
        pairs.push(("license".into(), self.license.clone()));
        pairs.push(("author".into(), self.author.clone()));
        if self.beta {
            pairs.push(("beta".into(), "1".into()));
        }
        pairs.push(("url".into(), self.url.clone()));
        pairs
    }
}

/// Response to `check_license`, `activate_license` and `deactivate_license`.
///
/// `license` and `error` are kept as raw strings because the store is free
/// to grow new codes; unknown fields are preserved in `extra`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LicenseResponse {
    #[serde(default)]
    pub success: bool,

    /// Status string: `valid`, `invalid`, `expired`, `revoked`,
    /// `site_inactive`, `item_name_mismatch`, `no_activations_left`, ...
    #[serde(default)]
    pub license: Option<String>,

    /// Error code present on failed requests
    #[serde(default)]
    pub error: Option<String>,

    /// Expiration date string, e.g. `2024-06-01 23:59:59` or `lifetime`
    #[serde(default)]
    pub expires: Option<String>,

    #[serde(default)]
    pub customer_name: Option<String>,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LicenseResponse {
    /// The `license` field, defaulting to `invalid` when absent
    pub fn license_or_invalid(&self) -> &str {
        self.license.as_deref().unwrap_or("invalid")
    }

    /// Whether the store reports this license as currently valid
    pub fn is_valid(&self) -> bool {
        self.success && self.license_or_invalid() == "valid"
    }

    /// The code to feed into error-message mapping: the `error` field on a
    /// failed request, otherwise the non-`valid` status string.
    pub fn error_code(&self) -> &str {
        if !self.success {
            if let Some(error) = self.error.as_deref() {
                return error;
            }
        }
        self.license_or_invalid()
    }
}

/// Response to `get_version`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub new_version: Option<String>,

    #[serde(default)]
    pub stable_version: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub download_link: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub requires: Option<String>,

    #[serde(default)]
    pub last_updated: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
