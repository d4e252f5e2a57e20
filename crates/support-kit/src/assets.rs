//! Bundled front-end assets
//!
//! The host plugin registers these with its own asset pipeline under
//! prefixed handles so two plugins embedding this toolkit never collide.

/// Support form behavior: double-submit guard plus manual validity
/// reporting for widgets nested inside a third-party settings form
pub const FORM_JS: &str = include_str!("../assets/js/form.js");

/// Auto-submits the settings form when the beta checkbox toggles
pub const BETA_CHECKBOX_JS: &str = include_str!("../assets/js/beta-checkbox.js");

/// Handle names the host should register the scripts under
pub fn script_handles(prefix: &str) -> Vec<(String, &'static str)> {
    vec![
        (format!("{prefix}_form"), FORM_JS),
        (format!("{prefix}_beta_checkbox"), BETA_CHECKBOX_JS),
    ]
}
