//! # support-kit
//!
//! Embeddable support and licensing toolkit for premium plugins sold
//! through an EDD-style store.
//!
//! One [`Support`] instance per host plugin wires together:
//!
//! - license activation, deactivation, deletion and cached validity
//!   checks against the vendor's store
//! - an update checker with a register nag and a beta release channel
//! - a sidebar support form that mails the vendor with a plain-text
//!   diagnostic report attached
//! - overridable HTML templates and the admin-side scripts behind them
//!
//! Everything persisted is namespaced by a prefix derived from the host
//! plugin's text domain, so any number of plugins can embed the toolkit
//! on the same site without colliding.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use support_kit::{PluginMetadata, RequestContext, SiteInventory, Support, SupportConfig};
//!
//! let config = SupportConfig::new(
//!     "/srv/plugins/example-plugin/example-plugin.php",
//!     PluginMetadata {
//!         name: "Example Plugin".into(),
//!         version: "2.1.0".into(),
//!         author: "Vendor".into(),
//!         text_domain: "example-plugin".into(),
//!         plugin_uri: Some("https://example.com/plugin".into()),
//!     },
//!     "https://store.example.com",
//!     "https://customer-site.example.com",
//!     "support@example.com",
//! );
//!
//! let api = Arc::new(edd_client::EddClient::new("https://store.example.com")?);
//! let support = Support::new(config, store, api, mailer)?;
//!
//! // Once per admin request, after nonce/capability verification:
//! let ctx = RequestContext::new().with_manage_capability(true);
//! support.handle_request(&ctx, &SiteInventory::default()).await;
//! for notice in support.notices() {
//!     // hand off to the host's admin-notice mechanism
//! }
//! ```

mod assets;
mod beta;
mod config;
mod email;
mod error;
mod l10n;
mod license;
mod notice;
mod report;
mod request;
mod store;
mod support;
mod template;
mod updater;

pub use edd_client;

pub use assets::{BETA_CHECKBOX_JS, FORM_JS, script_handles};
pub use beta::BetaOptIn;
pub use config::{PluginMetadata, SupportConfig, derive_prefix};
pub use email::{
    ATTACHMENT_NAME, Attachment, Mailer, MockMailer, OutgoingEmail, SUPPORT_HEADER, SupportEmail,
};
pub use error::{Result, SupportError};
pub use l10n::{L10n, default_table, fill, merge_defaults};
pub use license::{INVALID, LicenseManager, VALID};
pub use notice::{Notice, NoticeKind, NoticeLog};
pub use report::{
    DebugReport, HookFn, PluginEntry, ReportHook, ReportHooks, SiteInventory, ThemeInfo,
};
pub use request::{LicenseAction, RequestContext};
pub use store::{DAY, MemoryStore, SettingsStore, StoreKeys};
pub use support::Support;
pub use template::{OVERRIDE_DIR, TemplateEngine};
pub use updater::{
    MIN_BETA_UPDATER_VERSION, UPDATER_VERSION, UpdateAvailable, UpdateChecker,
};
