//! Template Renderer with Host Overrides
//!
//! Each markup fragment ships as a bundled default but can be replaced
//! by the host plugin: a file with the same name under
//! `<plugin_dir>/support-kit/` wins over the bundled copy. Values are
//! interpolated into `{{name}}` placeholders; unknown placeholders are
//! left in place so a missing variable is visible instead of silent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SupportError};

/// Subdirectory of the plugin dir scanned for overrides
pub const OVERRIDE_DIR: &str = "support-kit";

const SIDEBAR_SUPPORT: &str = include_str!("../templates/sidebar-support.html");
const SIDEBAR_SUPPORT_DISABLED: &str = include_str!("../templates/sidebar-support-disabled.html");
const LICENSING_FIELDS: &str = include_str!("../templates/licensing-fields.html");
const BETA_CHECKBOX: &str = include_str!("../templates/beta-checkbox.html");
const LICENSE_NAG: &str = include_str!("../templates/license-nag.html");

/// Per-plugin template lookup and interpolation
pub struct TemplateEngine {
    override_dir: PathBuf,
}

impl TemplateEngine {
    pub(crate) fn new(plugin_dir: &Path) -> Self {
        Self {
            override_dir: plugin_dir.join(OVERRIDE_DIR),
        }
    }

    /// Render a named template with the given variables. The host's
    /// override file is preferred when present and readable.
    pub fn render(&self, name: &str, vars: &HashMap<&str, String>) -> Result<String> {
        let source = self.source(name)?;
        Ok(interpolate(&source, vars))
    }

    fn source(&self, name: &str) -> Result<String> {
        let override_path = self.override_dir.join(format!("{name}.html"));
        if override_path.is_file() {
            return Ok(std::fs::read_to_string(&override_path)?);
        }
        Ok(builtin(name)
            .ok_or_else(|| SupportError::UnknownTemplate(name.to_string()))?
            .to_string())
    }
}

fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "sidebar-support" => Some(SIDEBAR_SUPPORT),
        "sidebar-support-disabled" => Some(SIDEBAR_SUPPORT_DISABLED),
        "licensing-fields" => Some(LICENSING_FIELDS),
        "beta-checkbox" => Some(BETA_CHECKBOX),
        "license-nag" => Some(LICENSE_NAG),
        _ => None,
    }
}

fn interpolate(source: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = source.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect()
    }

    #[test]
    fn test_builtin_template_interpolates_placeholders() {
        let engine = TemplateEngine::new(Path::new("/nonexistent/plugin"));
        let html = engine
            .render(
                "license-nag",
                &vars(&[("prefix", "example_plugin"), ("message", "Register your copy.")]),
            )
            .unwrap();

        assert!(html.contains("example_plugin-license-nag"));
        assert!(html.contains("<p>Register your copy.</p>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_unknown_placeholders_stay_visible() {
        let engine = TemplateEngine::new(Path::new("/nonexistent/plugin"));
        let html = engine.render("license-nag", &HashMap::new()).unwrap();

        assert!(html.contains("{{message}}"));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let engine = TemplateEngine::new(Path::new("/nonexistent/plugin"));
        let err = engine.render("no-such-view", &HashMap::new()).unwrap_err();

        assert!(matches!(err, SupportError::UnknownTemplate(name) if name == "no-such-view"));
    }

    #[test]
    fn test_host_override_wins_over_builtin() {
        let plugin_dir = tempfile::tempdir().unwrap();
        let override_dir = plugin_dir.path().join(OVERRIDE_DIR);
        std::fs::create_dir_all(&override_dir).unwrap();
        std::fs::write(
            override_dir.join("license-nag.html"),
            "<aside>{{message}}</aside>",
        )
        .unwrap();

        let engine = TemplateEngine::new(plugin_dir.path());
        let html = engine
            .render("license-nag", &vars(&[("message", "custom nag")]))
            .unwrap();

        assert_eq!(html, "<aside>custom nag</aside>");

        // Other templates still come from the bundled copies
        let fields = engine
            .render("beta-checkbox", &vars(&[("prefix", "x"), ("checked", ""), ("label", "l"), ("nonce_field", "")]))
            .unwrap();
        assert!(fields.contains("support-kit-enable-beta"));
    }
}
