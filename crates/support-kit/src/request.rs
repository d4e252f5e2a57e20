//! Immutable request context
//!
//! The host builds one of these per admin request from whatever HTTP
//! layer it sits on, having already verified nonces and capabilities.
//! Handlers never touch globals; everything request-derived flows in
//! through this value.

use std::collections::{HashMap, HashSet};

/// License lifecycle action requested via `<prefix>_license_action`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LicenseAction {
    Activate,
    Save,
    Deactivate,
    Delete,
    DeleteDeactivate,
}

impl LicenseAction {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "activate" => Some(LicenseAction::Activate),
            "save" => Some(LicenseAction::Save),
            "deactivate" => Some(LicenseAction::Deactivate),
            "delete" => Some(LicenseAction::Delete),
            "delete_deactivate" => Some(LicenseAction::DeleteDeactivate),
            _ => None,
        }
    }

    /// Actions that clear stored license data
    pub fn deletes(self) -> bool {
        matches!(self, LicenseAction::Delete | LicenseAction::DeleteDeactivate)
    }

    /// Actions that release the site activation on the store
    pub fn deactivates(self) -> bool {
        matches!(
            self,
            LicenseAction::Deactivate | LicenseAction::DeleteDeactivate
        )
    }
}

/// Request parameters and host-verified authorization flags
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    params: HashMap<String, String>,
    verified_nonces: HashSet<String>,
    can_manage: bool,
    force_check: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Record that the host verified the nonce for this action
    pub fn with_verified_nonce(mut self, action: impl Into<String>) -> Self {
        self.verified_nonces.insert(action.into());
        self
    }

    /// Whether the current user may manage this site's settings
    pub fn with_manage_capability(mut self, can_manage: bool) -> Self {
        self.can_manage = can_manage;
        self
    }

    /// The `force-check-license` query flag
    pub fn with_force_check(mut self, force_check: bool) -> Self {
        self.force_check = force_check;
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn nonce_verified(&self, action: &str) -> bool {
        self.verified_nonces.contains(action)
    }

    pub fn can_manage(&self) -> bool {
        self.can_manage
    }

    pub fn force_check(&self) -> bool {
        self.force_check
    }

    /// Parse the license action for this plugin, if any
    pub fn license_action(&self, prefix: &str) -> Option<LicenseAction> {
        self.param(&format!("{prefix}_license_action"))
            .and_then(LicenseAction::from_param)
    }

    /// Whether the support form for this plugin was submitted
    pub fn support_submitted(&self, prefix: &str) -> bool {
        self.param(&format!("{prefix}_support_submit")).is_some()
    }

    /// The submitted license key param, if present
    pub fn license_key_param(&self, prefix: &str) -> Option<&str> {
        self.param(&format!("{prefix}_license_key"))
    }

    /// Whether the beta checkbox was submitted checked
    pub fn beta_enabled_param(&self, prefix: &str) -> bool {
        self.param(&format!("{prefix}_enable_beta"))
            .is_some_and(|v| v == "1" || v == "true" || v == "on")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_action_parsing() {
        let ctx = RequestContext::new().with_param("example_license_action", "delete_deactivate");

        let action = ctx.license_action("example").unwrap();
        assert_eq!(action, LicenseAction::DeleteDeactivate);
        assert!(action.deletes());
        assert!(action.deactivates());

        assert!(ctx.license_action("other").is_none());
    }

    #[test]
    fn test_unknown_action_is_ignored() {
        let ctx = RequestContext::new().with_param("example_license_action", "explode");
        assert!(ctx.license_action("example").is_none());
    }

    #[test]
    fn test_nonce_and_capability_flags() {
        let ctx = RequestContext::new()
            .with_verified_nonce("example_license")
            .with_manage_capability(true)
            .with_force_check(true);

        assert!(ctx.nonce_verified("example_license"));
        assert!(!ctx.nonce_verified("example_beta"));
        assert!(ctx.can_manage());
        assert!(ctx.force_check());
    }

    #[test]
    fn test_beta_param_values() {
        assert!(
            RequestContext::new()
                .with_param("p_enable_beta", "1")
                .beta_enabled_param("p")
        );
        assert!(
            !RequestContext::new()
                .with_param("p_enable_beta", "0")
                .beta_enabled_param("p")
        );
        assert!(!RequestContext::new().beta_enabled_param("p"));
    }
}
