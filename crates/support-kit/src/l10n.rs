//! Localization table
//!
//! Every user-facing string lives in a nested table. Hosts override any
//! subset of keys; overrides are merged recursively over the built-in
//! defaults (override wins per leaf key, untouched defaults survive).
//!
//! Strings use `{placeholder}` markers; call sites substitute with
//! [`fill`].

use serde_json::{Value, json};

/// Built-in default strings
pub fn default_table() -> Value {
    json!({
        "license_error_messages": {
            "expired": "Your {plugin} license key expired on {date}.",
            "revoked": "Your license key has been disabled.",
            "missing": "Invalid license.",
            "site_inactive": "Your license is not active for this URL.",
            "item_name_mismatch": "This appears to be an invalid license key for {plugin}.",
            "no_activations_left": "Your license key has reached its activation limit.",
            "no_connection": "{plugin} could not communicate with {store_url}. Please try again later.",
            "default": "An error occurred, please try again."
        },
        "license_activation": "{plugin} license successfully activated.",
        "license_deactivation": {
            "success": "{plugin} license successfully deactivated.",
            "error": "Error: could not deactivate the license for {plugin}."
        },
        "license_deletion": "{plugin} license successfully deleted.",
        "licensing_fields": {
            "label": "{plugin} License",
            "activate": "Activate",
            "deactivate": "Deactivate",
            "save_activate": "Save and Activate",
            "delete": "Delete",
            "delete_deactivate": "Delete and Deactivate",
            "active": "License Active",
            "inactive": "License Inactive"
        },
        "support_form": {
            "title": "Need some help with {plugin}?",
            "subject_placeholder": "Subject",
            "message_placeholder": "Message",
            "send": "Send",
            "disabled": "Premium support is disabled. Please register your product and activate your license for this website to enable.",
            "success": "Support message successfully sent!",
            "error": "Could not send support message."
        },
        "beta_checkbox": {
            "label": "Enable beta releases for {plugin}",
            "enabled": "Beta releases for {plugin} enabled.",
            "disabled": "Beta releases for {plugin} disabled."
        },
        "nag": {
            "register": "Register your copy of {plugin} now to receive automatic updates and support.",
            "purchase": "If you do not have a license key, you can <a href=\"{plugin_uri}\">purchase one</a>.",
            "activate": "If you already have a license key, you can <a href=\"{license_uri}\">activate it</a>."
        }
    })
}

/// Recursively merge `overrides` over `defaults`.
///
/// For matching object keys the merge recurses; everywhere else the
/// override value wins wholesale. Keys only present in `defaults` are
/// kept, keys only present in `overrides` are added.
pub fn merge_defaults(overrides: &Value, defaults: &Value) -> Value {
    match (overrides, defaults) {
        (Value::Object(over), Value::Object(def)) => {
            let mut merged = def.clone();
            for (key, value) in over {
                let entry = match def.get(key) {
                    Some(default_value) => merge_defaults(value, default_value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        _ => overrides.clone(),
    }
}

/// Substitute `{name}` placeholders in a localized string
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Resolved localization table for one plugin
#[derive(Clone, Debug)]
pub struct L10n {
    table: Value,
}

impl L10n {
    /// Build the table once, merging host overrides over the defaults
    pub fn new(overrides: Option<&Value>) -> Self {
        let table = match overrides {
            Some(overrides) => merge_defaults(overrides, &default_table()),
            None => default_table(),
        };
        Self { table }
    }

    /// Look up a string by dotted path, e.g.
    /// `license_error_messages.expired`. Unknown paths resolve to the
    /// generic fallback message so a partial override table never panics.
    pub fn text(&self, path: &str) -> String {
        let mut current = &self.table;
        for part in path.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => return self.fallback(),
            }
        }
        current
            .as_str()
            .map_or_else(|| self.fallback(), ToString::to_string)
    }

    fn fallback(&self) -> String {
        self.table
            .pointer("/license_error_messages/default")
            .and_then(Value::as_str)
            .unwrap_or("An error occurred, please try again.")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_override_wins_per_leaf_key() {
        let overrides = json!({ "a": { "x": 1 } });
        let defaults = json!({ "a": { "x": 0, "y": 2 }, "b": 3 });

        let merged = merge_defaults(&overrides, &defaults);

        assert_eq!(merged, json!({ "a": { "x": 1, "y": 2 }, "b": 3 }));
    }

    #[test]
    fn test_merge_adds_new_keys() {
        let overrides = json!({ "c": { "deep": "value" } });
        let defaults = json!({ "a": 1 });

        let merged = merge_defaults(&overrides, &defaults);

        assert_eq!(merged["a"], 1);
        assert_eq!(merged["c"]["deep"], "value");
    }

    #[test]
    fn test_l10n_lookup_and_override() {
        let l10n = L10n::new(Some(&json!({
            "license_activation": "Custom activation message for {plugin}."
        })));

        assert_eq!(
            l10n.text("license_activation"),
            "Custom activation message for {plugin}."
        );
        // Untouched defaults survive
        assert_eq!(l10n.text("license_error_messages.revoked"),
            "Your license key has been disabled.");
    }

    #[test]
    fn test_l10n_unknown_path_falls_back() {
        let l10n = L10n::new(None);
        assert_eq!(
            l10n.text("no.such.path"),
            "An error occurred, please try again."
        );
    }

    #[test]
    fn test_fill_placeholders() {
        let out = fill(
            "Your {plugin} license key expired on {date}.",
            &[("plugin", "Example"), ("date", "June 1, 2024")],
        );
        assert_eq!(out, "Your Example license key expired on June 1, 2024.");
    }
}
