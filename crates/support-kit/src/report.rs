//! Diagnostic debug report
//!
//! Renders the plain-text report attached to support emails: toolkit
//! version, installed and active plugins, active theme, platform and
//! runtime versions.
//!
//! Every section boundary is a named extension point so each vendor
//! plugin can append its own diagnostics without touching this module.
//! Hooks are fired in document order and their output is concatenated
//! in place.

use std::collections::HashMap;
use std::path::PathBuf;

/// One plugin as the host sees it. Missing header data is represented by
/// empty name/version fields and rendered as a fallback line.
#[derive(Clone, Debug, Default)]
pub struct PluginEntry {
    pub name: String,
    pub version: String,
    pub path: String,
}

impl PluginEntry {
    pub fn new(name: impl Into<String>, version: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
        }
    }

    fn has_metadata(&self) -> bool {
        !self.name.is_empty() && !self.version.is_empty()
    }
}

/// Active theme details
#[derive(Clone, Debug, Default)]
pub struct ThemeInfo {
    pub name: String,
    pub version: String,
    pub theme_uri: String,
    pub author_uri: String,
    pub parent: Option<String>,
}

/// Everything the host knows about its own site, gathered once per
/// request by the host and passed in.
#[derive(Clone, Debug, Default)]
pub struct SiteInventory {
    pub installed_plugins: Vec<PluginEntry>,
    pub active_plugins: Vec<PluginEntry>,
    pub theme: Option<ThemeInfo>,

    /// Host platform version line (e.g. the CMS release)
    pub platform_version: String,

    /// Language runtime version line
    pub runtime_version: String,
}

/// Named extension points, one per section boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportHook {
    Start,
    BeforeInstalledPluginsHeader,
    BeforeInstalledPluginsList,
    BeforeInstalledPlugin,
    AfterInstalledPlugin,
    AfterInstalledPluginsList,
    BeforeActivePluginsHeader,
    BeforeActivePluginsList,
    BeforeActivePlugin,
    AfterActivePlugin,
    AfterActivePluginsList,
    BeforeThemeHeader,
    BeforeThemeData,
    AfterThemeData,
    BeforePlatformHeader,
    BeforePlatformData,
    AfterPlatformData,
    BeforeRuntimeHeader,
    BeforeRuntimeData,
    AfterRuntimeData,
    End,
}

/// Fragment producer: appends to the report; per-plugin hooks also see
/// the entry being rendered.
pub type HookFn = Box<dyn Fn(&mut String, Option<&PluginEntry>) + Send + Sync>;

/// Ordered callback registry keyed by extension point
#[derive(Default)]
pub struct ReportHooks {
    hooks: HashMap<ReportHook, Vec<HookFn>>,
}

impl ReportHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment producer; producers on the same hook run in
    /// registration order.
    pub fn register<F>(&mut self, hook: ReportHook, producer: F)
    where
        F: Fn(&mut String, Option<&PluginEntry>) + Send + Sync + 'static,
    {
        self.hooks.entry(hook).or_default().push(Box::new(producer));
    }

    fn fire(&self, hook: ReportHook, out: &mut String, plugin: Option<&PluginEntry>) {
        if let Some(producers) = self.hooks.get(&hook) {
            for producer in producers {
                producer(out, plugin);
            }
        }
    }
}

/// Builder for the attached `support_site_info.txt`
pub struct DebugReport {
    toolkit_version: String,
    loaded_from: PathBuf,
    hooks: ReportHooks,
}

impl DebugReport {
    pub(crate) fn new(loaded_from: PathBuf) -> Self {
        Self {
            toolkit_version: env!("CARGO_PKG_VERSION").to_string(),
            loaded_from,
            hooks: ReportHooks::new(),
        }
    }

    pub fn hooks_mut(&mut self) -> &mut ReportHooks {
        &mut self.hooks
    }

    /// Render the full report
    pub fn render(&self, inventory: &SiteInventory) -> String {
        let mut out = String::new();

        out.push_str(&format!("= support-kit v{} =\n", self.toolkit_version));
        out.push_str(&format!("Loaded from: {}\n\n", self.loaded_from.display()));
        self.hooks.fire(ReportHook::Start, &mut out, None);

        self.hooks
            .fire(ReportHook::BeforeInstalledPluginsHeader, &mut out, None);
        if !inventory.installed_plugins.is_empty() {
            out.push_str("= Installed Plugins =\n");
            self.hooks
                .fire(ReportHook::BeforeInstalledPluginsList, &mut out, None);
            for plugin in &inventory.installed_plugins {
                self.hooks
                    .fire(ReportHook::BeforeInstalledPlugin, &mut out, Some(plugin));
                self.push_plugin_line(&mut out, plugin);
                self.hooks
                    .fire(ReportHook::AfterInstalledPlugin, &mut out, Some(plugin));
            }
        }
        self.hooks
            .fire(ReportHook::AfterInstalledPluginsList, &mut out, None);

        self.hooks
            .fire(ReportHook::BeforeActivePluginsHeader, &mut out, None);
        if !inventory.active_plugins.is_empty() {
            out.push_str("\n= Active Plugins =\n");
            self.hooks
                .fire(ReportHook::BeforeActivePluginsList, &mut out, None);
            for plugin in &inventory.active_plugins {
                self.hooks
                    .fire(ReportHook::BeforeActivePlugin, &mut out, Some(plugin));
                self.push_plugin_line(&mut out, plugin);
                self.hooks
                    .fire(ReportHook::AfterActivePlugin, &mut out, Some(plugin));
            }
            self.hooks
                .fire(ReportHook::AfterActivePluginsList, &mut out, None);
        }

        self.hooks.fire(ReportHook::BeforeThemeHeader, &mut out, None);
        if let Some(theme) = &inventory.theme {
            out.push_str("\n= Active Theme =\n");
            self.hooks.fire(ReportHook::BeforeThemeData, &mut out, None);
            out.push_str(&format!("Name: {}\n", theme.name));
            out.push_str(&format!("Version: {}\n", theme.version));
            out.push_str(&format!("Theme URI: {}\n", theme.theme_uri));
            out.push_str(&format!("Author URI: {}\n", theme.author_uri));
            if let Some(parent) = &theme.parent {
                out.push_str(&format!("Parent Theme: {parent}\n"));
            }
            self.hooks.fire(ReportHook::AfterThemeData, &mut out, None);
        }

        self.hooks
            .fire(ReportHook::BeforePlatformHeader, &mut out, None);
        out.push_str("\n= Platform =\n");
        self.hooks.fire(ReportHook::BeforePlatformData, &mut out, None);
        out.push_str(&format!("Version: {}\n", inventory.platform_version));
        self.hooks.fire(ReportHook::AfterPlatformData, &mut out, None);

        self.hooks.fire(ReportHook::BeforeRuntimeHeader, &mut out, None);
        out.push_str("\n= Runtime =\n");
        self.hooks.fire(ReportHook::BeforeRuntimeData, &mut out, None);
        out.push_str(&format!("Version: {}\n", inventory.runtime_version));
        self.hooks.fire(ReportHook::AfterRuntimeData, &mut out, None);

        self.hooks.fire(ReportHook::End, &mut out, None);

        out
    }

    fn push_plugin_line(&self, out: &mut String, plugin: &PluginEntry) {
        if plugin.has_metadata() {
            out.push_str(&format!("{}: {}\n", plugin.name, plugin.version));
        } else {
            out.push_str(&format!("No plugin data found for plugin at {}\n", plugin.path));
        }
    }
}
