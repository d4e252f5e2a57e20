//! Support Email Composer/Sender
//!
//! Gathers subject and message from the request, prepends the
//! version/plugin header block, and sends a single mail to the vendor's
//! support address with the diagnostic report attached. The attachment
//! rides on the transport's native mechanism; the custom header marks
//! the mail as ours so a transport-level hook can tell it apart from
//! every other email the site sends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::PluginMetadata;
use crate::error::{Result, SupportError};
use crate::l10n::L10n;
use crate::license::LicenseManager;
use crate::notice::NoticeLog;
use crate::report::{DebugReport, SiteInventory};
use crate::request::RequestContext;

/// Header marking outgoing support mail, value is the toolkit version
pub const SUPPORT_HEADER: &str = "X-SUPPORT-KIT";

/// Filename of the attached diagnostic report
pub const ATTACHMENT_NAME: &str = "support_site_info.txt";

/// A file attached to an outgoing email
#[derive(Clone, Debug)]
pub struct Attachment {
    pub filename: String,
    pub content: String,
}

/// A fully composed outgoing email
#[derive(Clone, Debug)]
pub struct OutgoingEmail {
    pub to: String,
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
    pub attachments: Vec<Attachment>,
}

/// Mail transport seam; the host wires its own
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// Capturing mailer (for tests and development)
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: std::sync::atomic::AtomicBool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SupportError::Mail("simulated transport refusal".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Per-plugin support email flow
pub struct SupportEmail {
    prefix: String,
    metadata: PluginMetadata,
    support_address: String,
    message_prefix: Option<String>,
    l10n: Arc<L10n>,
    notices: Arc<NoticeLog>,
    mailer: Arc<dyn Mailer>,
    license: Arc<LicenseManager>,
}

impl SupportEmail {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        prefix: &str,
        metadata: PluginMetadata,
        support_address: &str,
        message_prefix: Option<String>,
        l10n: Arc<L10n>,
        notices: Arc<NoticeLog>,
        mailer: Arc<dyn Mailer>,
        license: Arc<LicenseManager>,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            metadata,
            support_address: support_address.to_string(),
            message_prefix,
            l10n,
            notices,
            mailer,
            license,
        }
    }

    /// Send the support request, if the request carries everything it
    /// needs. Returns whether a mail went out.
    ///
    /// Requires the host-verified `<prefix>_support` nonce AND the
    /// manage capability; silently returns otherwise. Empty subject,
    /// empty message or missing license data also send nothing.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        report: &DebugReport,
        inventory: &SiteInventory,
    ) -> bool {
        if !ctx.nonce_verified(&format!("{}_support", self.prefix)) || !ctx.can_manage() {
            return false;
        }

        let subject = ctx.param("support_subject").unwrap_or_default().trim().to_string();
        let message = ctx.param("support_message").unwrap_or_default().trim().to_string();
        let license_data = self.license.license_data(ctx).await;

        let Some(license_data) = license_data else {
            return false;
        };
        if subject.is_empty() || message.is_empty() {
            return false;
        }

        let header_block = self.message_prefix.clone().unwrap_or_else(|| {
            format!(
                "Sent via support-kit v{}\nPlugin: {} v{}\n\n",
                env!("CARGO_PKG_VERSION"),
                self.metadata.name,
                self.metadata.version,
            )
        });

        let email = OutgoingEmail {
            to: self.support_address.clone(),
            from_name: license_data.customer_name.clone().unwrap_or_default(),
            from_email: license_data.customer_email.clone().unwrap_or_default(),
            subject,
            body: format!("{header_block}{message}"),
            headers: vec![(
                SUPPORT_HEADER.to_string(),
                env!("CARGO_PKG_VERSION").to_string(),
            )],
            attachments: vec![Attachment {
                filename: ATTACHMENT_NAME.to_string(),
                content: report.render(inventory),
            }],
        };

        match self.mailer.send(email).await {
            Ok(()) => {
                tracing::info!(plugin = %self.metadata.name, "Support email sent");
                self.notices.success(self.l10n.text("support_form.success"));
                true
            }
            Err(error) => {
                tracing::warn!(%error, plugin = %self.metadata.name, "Support email failed");
                self.notices.error(self.l10n.text("support_form.error"));
                false
            }
        }
    }
}
